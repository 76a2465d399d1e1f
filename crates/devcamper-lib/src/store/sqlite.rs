use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::{BoxFuture, FutureExt};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{ensure_unique, prepare_create, prepare_update, DocumentStore, UpdateOptions};
use crate::error::{Error, Result};
use crate::query::Filter;
use crate::record::{Document, Fields, RecordId};
use crate::schema::Schema;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id          TEXT PRIMARY KEY,
        collection  TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        body        TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS documents_collection ON documents (collection);
";

const SELECT_COLUMNS: &str = "SELECT id, created_at, body FROM documents";

/// SQLite-backed document store.
///
/// Documents live in one table keyed by identity and tagged with their
/// collection; the field map is stored as a JSON text column. Statements run
/// on tokio's blocking pool behind a connection mutex.
#[derive(Clone)]
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the documents table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening document store");
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn run<T, F>(&self, op: F) -> BoxFuture<'static, Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        async move {
            tokio::task::spawn_blocking(move || {
                let mut guard = connection.lock().unwrap_or_else(PoisonError::into_inner);
                op(&mut guard)
            })
            .await?
        }
        .boxed()
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

fn decode_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_document((id, created_at, body): (String, String, String)) -> Result<Document> {
    let corrupt = |message: String| Error::CorruptDocument {
        id: id.clone(),
        message,
    };
    let record_id: RecordId = id.parse().map_err(|_| corrupt("invalid id".to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| corrupt(format!("invalid created_at: {e}")))?
        .with_timezone(&Utc);
    let fields: Fields =
        serde_json::from_str(&body).map_err(|e| corrupt(format!("invalid body: {e}")))?;
    Ok(Document {
        id: record_id,
        created_at,
        fields,
    })
}

fn load_collection(connection: &Connection, collection: &str) -> Result<Vec<Document>> {
    let mut statement =
        connection.prepare(&format!("{SELECT_COLUMNS} WHERE collection = ?1 ORDER BY rowid"))?;
    let rows = statement.query_map(params![collection], decode_row)?;
    let mut documents = Vec::new();
    for row in rows {
        documents.push(into_document(row?)?);
    }
    Ok(documents)
}

fn load_one(connection: &Connection, collection: &str, id: RecordId) -> Result<Option<Document>> {
    connection
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE collection = ?1 AND id = ?2"),
            params![collection, id.to_string()],
            decode_row,
        )
        .optional()?
        .map(into_document)
        .transpose()
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl DocumentStore for SqliteStore {
    fn find(&self, schema: &'static Schema, filter: Filter) -> BoxFuture<'_, Result<Vec<Document>>> {
        self.run(move |connection| {
            let documents = load_collection(connection, schema.collection())?;
            Ok(documents
                .into_iter()
                .filter(|doc| filter.matches(doc))
                .collect())
        })
    }

    fn find_by_id(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        self.run(move |connection| load_one(connection, schema.collection(), id))
    }

    fn create(&self, schema: &'static Schema, fields: Fields) -> BoxFuture<'_, Result<Document>> {
        self.run(move |connection| {
            let document = prepare_create(schema, fields)?;
            let tx = connection.transaction()?;
            let existing = load_collection(&tx, schema.collection())?;
            ensure_unique(schema, &document, existing.iter())?;
            tx.execute(
                "INSERT INTO documents (id, collection, created_at, body) VALUES (?1, ?2, ?3, ?4)",
                params![
                    document.id.to_string(),
                    schema.collection(),
                    timestamp(&document.created_at),
                    serde_json::to_string(&document.fields)?,
                ],
            )?;
            tx.commit()?;
            debug!(collection = schema.collection(), id = %document.id, "document created");
            Ok(document)
        })
    }

    fn find_by_id_and_update(
        &self,
        schema: &'static Schema,
        id: RecordId,
        fields: Fields,
        options: UpdateOptions,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        self.run(move |connection| {
            let tx = connection.transaction()?;
            let Some(previous) = load_one(&tx, schema.collection(), id)? else {
                return Ok(None);
            };
            let updated = prepare_update(schema, &previous, fields, options)?;
            let existing = load_collection(&tx, schema.collection())?;
            ensure_unique(schema, &updated, existing.iter())?;
            tx.execute(
                "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
                params![
                    serde_json::to_string(&updated.fields)?,
                    schema.collection(),
                    id.to_string(),
                ],
            )?;
            tx.commit()?;
            debug!(collection = schema.collection(), id = %id, "document updated");
            Ok(Some(if options.return_new { updated } else { previous }))
        })
    }

    fn find_by_id_and_delete(
        &self,
        schema: &'static Schema,
        id: RecordId,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        self.run(move |connection| {
            let tx = connection.transaction()?;
            let Some(previous) = load_one(&tx, schema.collection(), id)? else {
                return Ok(None);
            };
            tx.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![schema.collection(), id.to_string()],
            )?;
            tx.commit()?;
            debug!(collection = schema.collection(), id = %id, "document deleted");
            Ok(Some(previous))
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        self.run(|connection| {
            connection.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
