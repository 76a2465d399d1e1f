use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};

use super::{ensure_unique, prepare_create, prepare_update, DocumentStore, UpdateOptions};
use crate::error::Result;
use crate::query::Filter;
use crate::record::{Document, Fields, RecordId};
use crate::schema::Schema;

/// In-process document store.
///
/// Every operation completes under a single lock, so uniqueness checks and the
/// write they guard cannot interleave with another request.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn find_sync(&self, schema: &Schema, filter: &Filter) -> Vec<Document> {
        self.lock()
            .get(schema.collection())
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_by_id_sync(&self, schema: &Schema, id: RecordId) -> Option<Document> {
        self.lock()
            .get(schema.collection())
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned())
    }

    fn create_sync(&self, schema: &Schema, fields: Fields) -> Result<Document> {
        let document = prepare_create(schema, fields)?;
        let mut collections = self.lock();
        let docs = collections.entry(schema.collection()).or_default();
        ensure_unique(schema, &document, docs.iter())?;
        docs.push(document.clone());
        Ok(document)
    }

    fn update_sync(
        &self,
        schema: &Schema,
        id: RecordId,
        patch: Fields,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        let mut collections = self.lock();
        let Some(docs) = collections.get_mut(schema.collection()) else {
            return Ok(None);
        };
        let Some(position) = docs.iter().position(|doc| doc.id == id) else {
            return Ok(None);
        };

        let updated = prepare_update(schema, &docs[position], patch, options)?;
        ensure_unique(schema, &updated, docs.iter())?;
        let previous = std::mem::replace(&mut docs[position], updated.clone());

        Ok(Some(if options.return_new { updated } else { previous }))
    }

    fn delete_sync(&self, schema: &Schema, id: RecordId) -> Option<Document> {
        let mut collections = self.lock();
        let docs = collections.get_mut(schema.collection())?;
        let position = docs.iter().position(|doc| doc.id == id)?;
        Some(docs.remove(position))
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, schema: &'static Schema, filter: Filter) -> BoxFuture<'_, Result<Vec<Document>>> {
        future::ready(Ok(self.find_sync(schema, &filter))).boxed()
    }

    fn find_by_id(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        future::ready(Ok(self.find_by_id_sync(schema, id))).boxed()
    }

    fn create(&self, schema: &'static Schema, fields: Fields) -> BoxFuture<'_, Result<Document>> {
        future::ready(self.create_sync(schema, fields)).boxed()
    }

    fn find_by_id_and_update(
        &self,
        schema: &'static Schema,
        id: RecordId,
        fields: Fields,
        options: UpdateOptions,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        future::ready(self.update_sync(schema, id, fields, options)).boxed()
    }

    fn find_by_id_and_delete(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        future::ready(Ok(self.delete_sync(schema, id))).boxed()
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        future::ready(Ok(())).boxed()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
