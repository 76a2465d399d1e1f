//! Shared fixtures for store and controller integration tests.

use std::sync::Arc;

use devcamper_lib::{DocumentStore, Fields, MemoryStore, SqliteStore};
use serde_json::{json, Value};

/// Every store backend under test, labelled for assertion messages.
pub fn stores() -> Vec<(&'static str, Arc<dyn DocumentStore>)> {
    vec![
        ("memory", Arc::new(MemoryStore::new())),
        (
            "sqlite",
            Arc::new(SqliteStore::open_in_memory().expect("open in-memory sqlite")),
        ),
    ]
}

#[allow(dead_code)]
pub fn fields(value: Value) -> Fields {
    serde_json::from_value(value).expect("fixture is an object")
}

/// A valid bootcamp located in Boston's Allston neighbourhood.
pub fn devworks() -> Fields {
    fields(json!({
        "name": "Devworks Bootcamp",
        "description": "Devworks is a full stack JavaScript Bootcamp located in the heart of Boston",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "location": {"type": "Point", "coordinates": [-71.104081, 42.350846]},
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true,
        "jobGuarantee": false,
        "acceptGi": true
    }))
}

/// A valid bootcamp located in Lowell, roughly 25 miles north of Boston.
#[allow(dead_code)]
pub fn modern_tech() -> Fields {
    fields(json!({
        "name": "ModernTech Bootcamp",
        "description": "ModernTech has one goal, and that is to make you a rockstar developer",
        "address": "220 Pawtucket St, Lowell, MA 01854",
        "location": {"type": "Point", "coordinates": [-71.324646, 42.6431]},
        "careers": ["Web Development", "UI/UX", "Mobile Development"],
        "averageCost": 10000,
        "acceptGi": false
    }))
}
