use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::doc::{Doc, DocId, Record};
use crate::error::StoreError;
use crate::filter::{Filter, FindOptions};
use crate::store::{apply_update, next_timestamp, sort_docs, DocStore, Docs};
use crate::update::Update;

/// SQLite-backed collection: one shared `docs` table keyed by
/// `(collection, seq)`, JSON document payloads. The connection mutex is
/// held across every read-modify-write, which keeps per-document
/// mutations atomic.
pub struct SqliteDocStore<T> {
    collection: String,
    conn: Arc<Mutex<Connection>>,
    clock: AtomicI64,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> SqliteDocStore<T> {
    pub fn open(path: &str, collection: impl Into<String>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|err| StoreError::Backend(err.to_string()))?;
        Self::with_connection(Arc::new(Mutex::new(conn)), collection)
    }

    /// Scopes a collection inside a shared connection, so every concept
    /// can use one database file.
    pub fn with_connection(
        conn: Arc<Mutex<Connection>>,
        collection: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let store = Self {
            collection: collection.into(),
            conn,
            clock: AtomicI64::new(0),
            _record: PhantomData,
        };
        store.ensure_schema()?;
        let guard = store.conn.lock();
        let mut last = 0;
        for (_, doc) in store.load_all(&guard)? {
            last = last.max(doc.updated_ms);
        }
        drop(guard);
        store.clock.store(last, Ordering::Relaxed);
        Ok(store)
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS docs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                doc TEXT NOT NULL
            );",
        )
        .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(())
    }

    fn load_all(&self, conn: &Connection) -> Result<Vec<(i64, Doc<T>)>, StoreError> {
        let mut stmt = conn
            .prepare("SELECT seq, doc FROM docs WHERE collection = ?1 ORDER BY seq")
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        let mut rows = stmt
            .query(params![self.collection])
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        let mut docs = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| StoreError::Backend(err.to_string()))?
        {
            let seq: i64 = row
                .get(0)
                .map_err(|err| StoreError::Backend(err.to_string()))?;
            let payload: String = row
                .get(1)
                .map_err(|err| StoreError::Backend(err.to_string()))?;
            let doc: Doc<T> = serde_json::from_str(&payload)
                .map_err(|err| StoreError::Serialization(err.to_string()))?;
            docs.push((seq, doc));
        }
        Ok(docs)
    }

    fn insert(&self, conn: &Connection, fields: T) -> Result<DocId, StoreError> {
        let now = next_timestamp(&self.clock);
        let doc = Doc {
            id: DocId::generate(),
            created_ms: now,
            updated_ms: now,
            fields,
        };
        let payload =
            serde_json::to_string(&doc).map_err(|err| StoreError::Serialization(err.to_string()))?;
        conn.execute(
            "INSERT INTO docs (collection, doc) VALUES (?1, ?2)",
            params![self.collection, payload],
        )
        .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(doc.id)
    }

    fn store_doc(&self, conn: &Connection, seq: i64, doc: &Doc<T>) -> Result<(), StoreError> {
        let payload =
            serde_json::to_string(doc).map_err(|err| StoreError::Serialization(err.to_string()))?;
        conn.execute(
            "UPDATE docs SET doc = ?1 WHERE seq = ?2",
            params![payload, seq],
        )
        .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(())
    }
}

impl<T: Record> DocStore<T> for SqliteDocStore<T> {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn create_one(&self, fields: T) -> Result<DocId, StoreError> {
        let conn = self.conn.lock();
        self.insert(&conn, fields)
    }

    fn create_if_absent(&self, filter: &Filter, fields: T) -> Result<Option<DocId>, StoreError> {
        let conn = self.conn.lock();
        for (_, doc) in self.load_all(&conn)? {
            if filter.matches(&doc)? {
                return Ok(None);
            }
        }
        Ok(Some(self.insert(&conn, fields)?))
    }

    fn read_one(&self, filter: &Filter, options: FindOptions) -> Result<Option<Doc<T>>, StoreError> {
        let mut matches = self.read_many(filter, options)?;
        Ok(matches.next())
    }

    fn read_many(&self, filter: &Filter, options: FindOptions) -> Result<Docs<T>, StoreError> {
        let conn = self.conn.lock();
        let mut matches = Vec::new();
        for (_, doc) in self.load_all(&conn)? {
            if filter.matches(&doc)? {
                matches.push(doc);
            }
        }
        drop(conn);
        sort_docs(&mut matches, options.sort);
        Ok(Docs::new(matches))
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        for (seq, mut doc) in self.load_all(&conn)? {
            if filter.matches(&doc)? {
                let now = next_timestamp(&self.clock);
                apply_update(&mut doc, update, now)?;
                self.store_doc(&conn, seq, &doc)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        for (seq, doc) in self.load_all(&conn)? {
            if filter.matches(&doc)? {
                conn.execute("DELETE FROM docs WHERE seq = ?1", params![seq])
                    .map_err(|err| StoreError::Backend(err.to_string()))?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
