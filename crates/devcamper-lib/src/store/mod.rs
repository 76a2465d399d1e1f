//! Document store collaborator.
//!
//! [`DocumentStore`] is the narrow interface the resource controller talks to.
//! It is object safe so services can hold an `Arc<dyn DocumentStore>` and tests
//! can swap in doubles. Two implementations ship with the crate:
//!
//! - [`SqliteStore`]: JSON documents in a single SQLite table
//! - [`MemoryStore`]: a mutex-guarded map, for tests and ephemeral runs
//!
//! Both delegate validation to the collection [`Schema`] before any write, so a
//! rejected create never leaves a partial record behind.

use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::query::Filter;
use crate::record::{merge_fields, Document, Fields, RecordId};
use crate::schema::Schema;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Behaviour requested from `find_by_id_and_update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Return the post-update document rather than the previous one.
    pub return_new: bool,
    /// Run schema validation over the merged field set.
    pub run_validators: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            return_new: true,
            run_validators: true,
        }
    }
}

/// Asynchronous CRUD interface over schema-validated collections.
pub trait DocumentStore: Send + Sync {
    /// All documents in the collection matching `filter`, in insertion order.
    fn find(&self, schema: &'static Schema, filter: Filter) -> BoxFuture<'_, Result<Vec<Document>>>;

    fn find_by_id(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>>;

    /// Validate `fields` and persist them under a new identity.
    fn create(&self, schema: &'static Schema, fields: Fields) -> BoxFuture<'_, Result<Document>>;

    /// Merge `fields` over the stored document. `None` when `id` is absent.
    fn find_by_id_and_update(
        &self,
        schema: &'static Schema,
        id: RecordId,
        fields: Fields,
        options: UpdateOptions,
    ) -> BoxFuture<'_, Result<Option<Document>>>;

    /// Remove the document, returning it. `None` when `id` is absent.
    fn find_by_id_and_delete(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>>;

    /// Cheap connectivity check used by readiness probes.
    fn ping(&self) -> BoxFuture<'_, Result<()>>;

    /// Short backend label for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Validate and seal a field set for insertion.
pub(crate) fn prepare_create(schema: &Schema, fields: Fields) -> Result<Document> {
    let validated = schema.validate(fields)?;
    Ok(Document::new(schema.seal(validated)))
}

/// Build the replacement document for an update.
pub(crate) fn prepare_update(
    schema: &Schema,
    existing: &Document,
    patch: Fields,
    options: UpdateOptions,
) -> Result<Document> {
    let supplied: Vec<String> = patch.keys().cloned().collect();
    let merged = merge_fields(&existing.fields, patch);
    let merged = if options.run_validators {
        schema.validate(merged)?
    } else {
        merged
    };
    Ok(Document {
        id: existing.id,
        created_at: existing.created_at,
        fields: schema.seal_supplied(merged, |field| supplied.iter().any(|k| k == field)),
    })
}

/// Reject `candidate` when a unique field repeats a value held by another document.
pub(crate) fn ensure_unique<'a>(
    schema: &Schema,
    candidate: &Document,
    others: impl IntoIterator<Item = &'a Document>,
) -> Result<()> {
    let unique = schema.unique_fields();
    if unique.is_empty() {
        return Ok(());
    }
    for other in others {
        if other.id == candidate.id {
            continue;
        }
        for field in unique {
            if let (Some(mine), Some(theirs)) = (candidate.get(field), other.get(field)) {
                if mine == theirs {
                    return Err(Error::DuplicateKey {
                        field: (*field).to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        serde_json::from_value(value).unwrap()
    }

    fn bootcamp(name: &str) -> Fields {
        fields(json!({
            "name": name,
            "description": "desc",
            "address": "Boston MA",
            "careers": ["Business"]
        }))
    }

    #[test]
    fn update_keeps_identity_and_creation_time() {
        let existing = prepare_create(schema::bootcamps(), bootcamp("A")).unwrap();
        let updated = prepare_update(
            schema::bootcamps(),
            &existing,
            fields(json!({"housing": true})),
            UpdateOptions::default(),
        )
        .unwrap();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.created_at, existing.created_at);
        assert_eq!(updated.get("housing"), Some(&json!(true)));
        assert_eq!(updated.get("name"), Some(&json!("A")));
    }

    #[test]
    fn update_revalidates_merged_fields() {
        let existing = prepare_create(schema::bootcamps(), bootcamp("A")).unwrap();
        let err = prepare_update(
            schema::bootcamps(),
            &existing,
            fields(json!({"name": null})),
            UpdateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn update_without_validators_skips_schema() {
        let existing = prepare_create(schema::bootcamps(), bootcamp("A")).unwrap();
        let options = UpdateOptions {
            return_new: true,
            run_validators: false,
        };
        let updated = prepare_update(
            schema::bootcamps(),
            &existing,
            fields(json!({"averageRating": 99})),
            options,
        )
        .unwrap();
        assert_eq!(updated.get("averageRating"), Some(&json!(99)));
    }

    #[test]
    fn update_rehashes_only_a_supplied_password() {
        let user = fields(json!({
            "name": "John Doe",
            "email": "john@gmail.com",
            "password": "123456",
            "role": "user"
        }));
        let existing = prepare_create(schema::users(), user).unwrap();
        let digest = existing.get("password").cloned().unwrap();

        let renamed = prepare_update(
            schema::users(),
            &existing,
            fields(json!({"name": "Johnny"})),
            UpdateOptions::default(),
        )
        .unwrap();
        assert_eq!(renamed.get("password"), Some(&digest));

        let changed = prepare_update(
            schema::users(),
            &renamed,
            fields(json!({"password": "abcdefg"})),
            UpdateOptions::default(),
        )
        .unwrap();
        let stored = changed.get("password").and_then(|v| v.as_str()).unwrap();
        assert_ne!(Some(stored), digest.as_str());
        assert!(schema::verify_secret(stored, "abcdefg"));
    }

    #[test]
    fn unique_fields_reject_repeats_but_not_self() {
        let first = prepare_create(schema::bootcamps(), bootcamp("Same")).unwrap();
        let second = prepare_create(schema::bootcamps(), bootcamp("Same")).unwrap();

        assert!(ensure_unique(schema::bootcamps(), &first, [&first]).is_ok());
        let err = ensure_unique(schema::bootcamps(), &second, [&first]).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { field } if field == "name"));
    }
}
