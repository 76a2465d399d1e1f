//! Record identity and the open field mapping persisted by document stores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Client-supplied field mapping for create and update requests.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Store-assigned identity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh, time-sortable identity.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(RecordId)
            .map_err(|_| Error::MalformedId {
                value: s.to_string(),
            })
    }
}

/// A persisted record: identity, creation time and validated fields.
///
/// Serializes flat, with the identity under `_id`:
///
/// ```text
/// {"_id":"0192...","createdAt":"2026-01-01T00:00:00Z","name":"Devworks Bootcamp",...}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: RecordId,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    /// Build a new document with a fresh identity and the current time.
    pub fn new(fields: Fields) -> Self {
        Self {
            id: RecordId::generate(),
            created_at: Utc::now(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.fields.get(field)
    }
}

/// Merge an update patch over existing fields.
///
/// Keys in `patch` replace existing values; a `null` value removes the key.
pub fn merge_fields(existing: &Fields, patch: Fields) -> Fields {
    let mut merged = existing.clone();
    for (key, value) in patch {
        if value.is_null() {
            merged.remove(&key);
        } else {
            merged.insert(key, value);
        }
    }
    merged
}
