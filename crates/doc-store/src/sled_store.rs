use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;

use crate::doc::{Doc, DocId, Record};
use crate::error::StoreError;
use crate::filter::{Filter, FindOptions};
use crate::store::{apply_update, next_timestamp, sort_docs, DocStore, Docs};
use crate::update::Update;

/// Sled-backed collection: one tree per collection, monotonic
/// `generate_id` keys so iteration order is insertion order, JSON
/// document payloads flushed after every write.
pub struct SledDocStore<T> {
    collection: String,
    db: sled::Db,
    tree: sled::Tree,
    write_lock: Mutex<()>,
    clock: AtomicI64,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> SledDocStore<T> {
    pub fn open(path: &str, collection: impl Into<String>) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|err| StoreError::Backend(err.to_string()))?;
        Self::with_db(db, collection)
    }

    /// Scopes a collection inside an already opened database, so every
    /// concept can share one sled file.
    pub fn with_db(db: sled::Db, collection: impl Into<String>) -> Result<Self, StoreError> {
        let collection = collection.into();
        let tree = db
            .open_tree(collection.as_bytes())
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        let store = Self {
            collection,
            db,
            tree,
            write_lock: Mutex::new(()),
            clock: AtomicI64::new(0),
            _record: PhantomData,
        };
        // Resume the logical clock past anything already persisted so
        // last-modified ordering stays strict across reopen.
        let mut last = 0;
        for (_, doc) in store.load_all()? {
            last = last.max(doc.updated_ms);
        }
        store.clock.store(last, Ordering::Relaxed);
        Ok(store)
    }

    fn load_all(&self) -> Result<Vec<(sled::IVec, Doc<T>)>, StoreError> {
        let mut docs = Vec::new();
        for entry in self.tree.iter() {
            let (key, value) = entry.map_err(|err| StoreError::Backend(err.to_string()))?;
            let doc: Doc<T> = serde_json::from_slice(&value)
                .map_err(|err| StoreError::Serialization(err.to_string()))?;
            docs.push((key, doc));
        }
        Ok(docs)
    }

    fn persist(&self, key: &[u8], doc: &Doc<T>) -> Result<(), StoreError> {
        let payload =
            serde_json::to_vec(doc).map_err(|err| StoreError::Serialization(err.to_string()))?;
        self.tree
            .insert(key, payload)
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        self.tree
            .flush()
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(())
    }

    fn insert(&self, fields: T) -> Result<DocId, StoreError> {
        let now = next_timestamp(&self.clock);
        let doc = Doc {
            id: DocId::generate(),
            created_ms: now,
            updated_ms: now,
            fields,
        };
        let key = self
            .db
            .generate_id()
            .map_err(|err| StoreError::Backend(err.to_string()))?
            .to_be_bytes();
        self.persist(&key, &doc)?;
        Ok(doc.id)
    }
}

impl<T: Record> DocStore<T> for SledDocStore<T> {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn create_one(&self, fields: T) -> Result<DocId, StoreError> {
        let _guard = self.write_lock.lock();
        self.insert(fields)
    }

    fn create_if_absent(&self, filter: &Filter, fields: T) -> Result<Option<DocId>, StoreError> {
        let _guard = self.write_lock.lock();
        for (_, doc) in self.load_all()? {
            if filter.matches(&doc)? {
                return Ok(None);
            }
        }
        Ok(Some(self.insert(fields)?))
    }

    fn read_one(&self, filter: &Filter, options: FindOptions) -> Result<Option<Doc<T>>, StoreError> {
        let mut matches = self.read_many(filter, options)?;
        Ok(matches.next())
    }

    fn read_many(&self, filter: &Filter, options: FindOptions) -> Result<Docs<T>, StoreError> {
        let mut matches = Vec::new();
        for (_, doc) in self.load_all()? {
            if filter.matches(&doc)? {
                matches.push(doc);
            }
        }
        sort_docs(&mut matches, options.sort);
        Ok(Docs::new(matches))
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock();
        for (key, mut doc) in self.load_all()? {
            if filter.matches(&doc)? {
                let now = next_timestamp(&self.clock);
                apply_update(&mut doc, update, now)?;
                self.persist(&key, &doc)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock();
        for (key, doc) in self.load_all()? {
            if filter.matches(&doc)? {
                self.tree
                    .remove(key)
                    .map_err(|err| StoreError::Backend(err.to_string()))?;
                self.tree
                    .flush()
                    .map_err(|err| StoreError::Backend(err.to_string()))?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
