//! Collection schemas and field validation.
//!
//! Stores delegate validation to a [`Schema`] before any write. Validation is
//! strict about shape: keys the schema does not declare are dropped, every
//! declared rule is checked, and all violations are reported together so the
//! client sees the complete list in one response.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, FieldError, Result};
use crate::record::{Document, Fields};
use crate::spatial::GeoPoint;

/// Prefix of every stored secret digest.
const SECRET_PREFIX: &str = "sha256$";

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$")
        .expect("URL pattern compiles")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// Careers a bootcamp may list.
pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

/// Roles a registering user may request.
pub const ROLES: &[&str] = &["user", "publisher"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    String,
    Secret,
    Number,
    Boolean,
    StringList,
    GeoPoint,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Secret => "a string",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "a boolean",
            FieldKind::StringList => "a list of strings",
            FieldKind::GeoPoint => "a GeoJSON point",
        }
    }
}

#[derive(Debug)]
enum Check {
    MinLen(usize, &'static str),
    MaxLen(usize, &'static str),
    Pattern(&'static Lazy<Regex>, &'static str),
    OneOf(&'static [&'static str], &'static str),
    Min(f64, &'static str),
    Max(f64, &'static str),
    NonEmpty(&'static str),
}

/// Validation rule for one declared field.
#[derive(Debug)]
pub struct FieldRule {
    field: &'static str,
    kind: FieldKind,
    required: Option<&'static str>,
    checks: Vec<Check>,
}

impl FieldRule {
    fn new(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            required: None,
            checks: Vec::new(),
        }
    }

    pub fn string(field: &'static str) -> Self {
        Self::new(field, FieldKind::String)
    }

    /// A string stored as a salted digest, never in clear text.
    pub fn secret(field: &'static str) -> Self {
        Self::new(field, FieldKind::Secret)
    }

    pub fn number(field: &'static str) -> Self {
        Self::new(field, FieldKind::Number)
    }

    pub fn boolean(field: &'static str) -> Self {
        Self::new(field, FieldKind::Boolean)
    }

    pub fn string_list(field: &'static str) -> Self {
        Self::new(field, FieldKind::StringList)
    }

    pub fn geo_point(field: &'static str) -> Self {
        Self::new(field, FieldKind::GeoPoint)
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    pub fn min_len(mut self, len: usize, message: &'static str) -> Self {
        self.checks.push(Check::MinLen(len, message));
        self
    }

    pub fn max_len(mut self, len: usize, message: &'static str) -> Self {
        self.checks.push(Check::MaxLen(len, message));
        self
    }

    pub fn pattern(mut self, pattern: &'static Lazy<Regex>, message: &'static str) -> Self {
        self.checks.push(Check::Pattern(pattern, message));
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str], message: &'static str) -> Self {
        self.checks.push(Check::OneOf(allowed, message));
        self
    }

    pub fn min(mut self, min: f64, message: &'static str) -> Self {
        self.checks.push(Check::Min(min, message));
        self
    }

    pub fn max(mut self, max: f64, message: &'static str) -> Self {
        self.checks.push(Check::Max(max, message));
        self
    }

    pub fn non_empty(mut self, message: &'static str) -> Self {
        self.checks.push(Check::NonEmpty(message));
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    fn is_missing(&self, value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => self.kind == FieldKind::StringList && items.is_empty(),
            _ => false,
        }
    }

    fn check(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) {
        if self.is_missing(value) {
            if let Some(message) = self.required {
                errors.push(FieldError::new(self.field, message));
            }
            return;
        }
        let Some(value) = value else { return };

        let type_ok = match self.kind {
            FieldKind::String | FieldKind::Secret => value.is_string(),
            FieldKind::Number => value.as_f64().is_some_and(f64::is_finite),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::GeoPoint => GeoPoint::from_geojson(value).is_some(),
        };
        if !type_ok {
            errors.push(FieldError::new(
                self.field,
                format!("{} must be {}", self.field, self.kind.describe()),
            ));
            return;
        }

        for check in &self.checks {
            if let Some(message) = check.violation(value) {
                errors.push(FieldError::new(self.field, message));
            }
        }
    }
}

impl Check {
    fn violation(&self, value: &Value) -> Option<&'static str> {
        let text = value.as_str();
        let number = value.as_f64();
        let failed = match self {
            Check::MinLen(len, _) => text.is_some_and(|s| s.chars().count() < *len),
            Check::MaxLen(len, _) => text.is_some_and(|s| s.chars().count() > *len),
            Check::Pattern(pattern, _) => text.is_some_and(|s| !pattern.is_match(s)),
            Check::OneOf(allowed, _) => match value {
                Value::String(s) => !allowed.contains(&s.as_str()),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|s| !allowed.contains(&s)),
                _ => false,
            },
            Check::Min(min, _) => number.is_some_and(|n| n < *min),
            Check::Max(max, _) => number.is_some_and(|n| n > *max),
            Check::NonEmpty(_) => value.as_array().is_some_and(Vec::is_empty),
        };
        if !failed {
            return None;
        }
        Some(match self {
            Check::MinLen(_, m)
            | Check::MaxLen(_, m)
            | Check::Pattern(_, m)
            | Check::OneOf(_, m)
            | Check::Min(_, m)
            | Check::Max(_, m)
            | Check::NonEmpty(m) => *m,
        })
    }
}

/// A collection definition: name, field rules, unique and hidden fields.
#[derive(Debug)]
pub struct Schema {
    collection: &'static str,
    resource: &'static str,
    rules: Vec<FieldRule>,
    unique: &'static [&'static str],
    hidden: &'static [&'static str],
}

impl Schema {
    pub fn new(collection: &'static str, resource: &'static str, rules: Vec<FieldRule>) -> Self {
        Self {
            collection,
            resource,
            rules,
            unique: &[],
            hidden: &[],
        }
    }

    /// Fields whose values must not repeat across the collection.
    pub fn with_unique(mut self, unique: &'static [&'static str]) -> Self {
        self.unique = unique;
        self
    }

    /// Fields never included in documents returned to callers.
    pub fn with_hidden(mut self, hidden: &'static [&'static str]) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Human-readable resource label used in error messages.
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn unique_fields(&self) -> &'static [&'static str] {
        self.unique
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Validate a complete field set, returning it stripped of undeclared keys.
    pub fn validate(&self, mut fields: Fields) -> Result<Fields> {
        fields.retain(|key, _| {
            let declared = self.rules.iter().any(|rule| rule.field == key.as_str());
            if !declared {
                debug!(collection = self.collection, field = %key, "dropping undeclared field");
            }
            declared
        });

        let mut errors = Vec::new();
        for rule in &self.rules {
            rule.check(fields.get(rule.field), &mut errors);
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(Error::Validation { errors })
        }
    }

    /// Replace every clear-text secret value with a salted digest.
    pub fn seal(&self, fields: Fields) -> Fields {
        self.seal_supplied(fields, |_| true)
    }

    /// Digest only the secret fields for which `supplied` holds.
    ///
    /// Updates pass the keys of the incoming patch, so a stored digest carried
    /// over from the existing document is never hashed a second time.
    pub fn seal_supplied(&self, mut fields: Fields, supplied: impl Fn(&str) -> bool) -> Fields {
        for rule in self.rules.iter().filter(|r| r.kind == FieldKind::Secret) {
            if !supplied(rule.field) {
                continue;
            }
            if let Some(Value::String(clear)) = fields.get(rule.field) {
                let sealed = digest_secret(clear);
                fields.insert(rule.field.to_string(), Value::String(sealed));
            }
        }
        fields
    }

    /// Strip hidden fields from a document before it leaves the store layer.
    pub fn redact(&self, mut document: Document) -> Document {
        for field in self.hidden {
            document.fields.remove(*field);
        }
        document
    }
}

fn digest_secret(clear: &str) -> String {
    let salt = Uuid::now_v7().simple().to_string();
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(clear.as_bytes());
    format!("{SECRET_PREFIX}{salt}${}", hex::encode(hasher.finalize()))
}

/// Check a clear-text candidate against a sealed secret.
pub fn verify_secret(sealed: &str, candidate: &str) -> bool {
    let Some(rest) = sealed.strip_prefix(SECRET_PREFIX) else {
        return false;
    };
    let Some((salt, expected)) = rest.split_once('$') else {
        return false;
    };
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(candidate.as_bytes());
    hex::encode(hasher.finalize()) == expected
}

static BOOTCAMPS: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "bootcamps",
        "Bootcamp",
        vec![
            FieldRule::string("name")
                .required("Please add a name")
                .max_len(50, "Name can not be more than 50 characters"),
            FieldRule::string("description")
                .required("Please add a description")
                .max_len(500, "Description can not be more than 500 characters"),
            FieldRule::string("website")
                .pattern(&URL_PATTERN, "Please use a valid URL with HTTP or HTTPS"),
            FieldRule::string("phone")
                .max_len(20, "Phone number can not be longer than 20 characters"),
            FieldRule::string("email").pattern(&EMAIL_PATTERN, "Please add a valid email"),
            FieldRule::string("address").required("Please add an address"),
            FieldRule::geo_point("location"),
            FieldRule::string_list("careers")
                .required("Please add at least one career")
                .non_empty("Please add at least one career")
                .one_of(CAREERS, "Career is not one of the supported values"),
            FieldRule::number("averageRating")
                .min(1.0, "Rating must be at least 1")
                .max(10.0, "Rating can not be more than 10"),
            FieldRule::number("averageCost").min(0.0, "Average cost can not be negative"),
            FieldRule::string("photo"),
            FieldRule::boolean("housing"),
            FieldRule::boolean("jobAssistance"),
            FieldRule::boolean("jobGuarantee"),
            FieldRule::boolean("acceptGi"),
        ],
    )
    .with_unique(&["name"])
});

static USERS: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "users",
        "User",
        vec![
            FieldRule::string("name").required("Please add a name"),
            FieldRule::string("email")
                .required("Please add an email")
                .pattern(&EMAIL_PATTERN, "Please add a valid email"),
            FieldRule::string("role").one_of(ROLES, "Role must be either user or publisher"),
            FieldRule::secret("password")
                .required("Please add a password")
                .min_len(6, "Password must be at least 6 characters"),
        ],
    )
    .with_unique(&["email"])
    .with_hidden(&["password"])
});

/// Schema of the `bootcamps` collection.
pub fn bootcamps() -> &'static Schema {
    &BOOTCAMPS
}

/// Schema of the `users` collection.
pub fn users() -> &'static Schema {
    &USERS
}
