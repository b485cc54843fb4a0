use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::doc::{now_ms, Doc, DocId, Record};
use crate::error::StoreError;
use crate::filter::{Filter, FindOptions, SortOrder};
use crate::update::{Update, PROTECTED_FIELDS};

/// Generic persistence primitive. Each concept owns exactly one store
/// instance scoped to one logical collection.
pub trait DocStore<T: Record>: Send + Sync {
    fn collection(&self) -> &str;

    /// Assigns identity and both timestamps, persists, returns the id.
    fn create_one(&self, fields: T) -> Result<DocId, StoreError>;

    /// Atomic check-then-insert: creates only when nothing matches the
    /// filter, otherwise returns `None`. The check and the write happen
    /// under the store's write lock, so concurrent callers cannot both
    /// insert for the same filter.
    fn create_if_absent(&self, filter: &Filter, fields: T) -> Result<Option<DocId>, StoreError>;

    /// Best match under the sort order, or `None`. A miss is not an
    /// error.
    fn read_one(&self, filter: &Filter, options: FindOptions) -> Result<Option<Doc<T>>, StoreError>;

    /// All matches as a finite, restartable cursor.
    fn read_many(&self, filter: &Filter, options: FindOptions) -> Result<Docs<T>, StoreError>;

    /// Partial merge into the first match in insertion order; refreshes
    /// the last-modified timestamp. Returns `false` when nothing
    /// matched; never creates a document.
    fn update_one(&self, filter: &Filter, update: &Update) -> Result<bool, StoreError>;

    /// Removes the first match; deleting an absent document is a no-op,
    /// not an error.
    fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError>;
}

/// Restartable cursor over a query result snapshot.
pub struct Docs<T> {
    docs: Vec<Doc<T>>,
    pos: usize,
}

impl<T: Clone> Docs<T> {
    pub(crate) fn new(docs: Vec<Doc<T>>) -> Self {
        Self { docs, pos: 0 }
    }

    /// Total number of matches, independent of cursor position.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Restarts iteration from the first match.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }
}

impl<T: Clone> Iterator for Docs<T> {
    type Item = Doc<T>;

    fn next(&mut self) -> Option<Doc<T>> {
        let doc = self.docs.get(self.pos).cloned();
        if doc.is_some() {
            self.pos += 1;
        }
        doc
    }
}

/// Per-store logical clock: wall-clock milliseconds, clamped to be
/// strictly increasing so last-modified ordering is total even for
/// mutations landing in the same millisecond.
pub(crate) fn next_timestamp(clock: &AtomicI64) -> i64 {
    let now = now_ms();
    let mut last = clock.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match clock.compare_exchange(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

pub(crate) fn sort_docs<T>(docs: &mut [Doc<T>], sort: SortOrder) {
    match sort {
        SortOrder::UpdatedDesc => docs.sort_by(|a, b| b.updated_ms.cmp(&a.updated_ms)),
        SortOrder::UpdatedAsc => docs.sort_by(|a, b| a.updated_ms.cmp(&b.updated_ms)),
    }
}

/// Merges an update payload into a document. All-or-nothing: protected
/// or unknown fields fail before anything is written back.
pub(crate) fn apply_update<T: Record>(
    doc: &mut Doc<T>,
    update: &Update,
    updated_ms: i64,
) -> Result<(), StoreError> {
    for field in update.keys() {
        if PROTECTED_FIELDS.contains(&field) {
            return Err(StoreError::ProtectedField(field.to_string()));
        }
    }
    let value = serde_json::to_value(&doc.fields)
        .map_err(|err| StoreError::Serialization(err.to_string()))?;
    let serde_json::Value::Object(mut map) = value else {
        return Err(StoreError::Serialization(
            "record does not serialize to an object".to_string(),
        ));
    };
    for field in update.keys() {
        if !map.contains_key(field) {
            return Err(StoreError::UnknownField(field.to_string()));
        }
    }
    for (field, value) in update.fields() {
        map.insert(field.clone(), value.clone());
    }
    let fields: T = serde_json::from_value(serde_json::Value::Object(map))
        .map_err(|err| StoreError::Serialization(err.to_string()))?;
    doc.fields = fields;
    doc.updated_ms = doc.updated_ms.max(updated_ms);
    Ok(())
}

/// Reference backend: one in-process collection behind a `RwLock`.
/// Read-modify-write holds the write lock for the whole operation, so
/// per-document mutations never interleave.
pub struct InMemoryDocStore<T> {
    collection: String,
    docs: RwLock<Vec<Doc<T>>>,
    clock: AtomicI64,
}

impl<T: Record> InMemoryDocStore<T> {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            docs: RwLock::new(Vec::new()),
            clock: AtomicI64::new(0),
        }
    }

    pub fn shared(collection: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(collection))
    }

    fn insert(&self, docs: &mut Vec<Doc<T>>, fields: T) -> DocId {
        let now = next_timestamp(&self.clock);
        let doc = Doc {
            id: DocId::generate(),
            created_ms: now,
            updated_ms: now,
            fields,
        };
        let id = doc.id;
        docs.push(doc);
        id
    }
}

impl<T: Record> DocStore<T> for InMemoryDocStore<T> {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn create_one(&self, fields: T) -> Result<DocId, StoreError> {
        let mut docs = self.docs.write();
        Ok(self.insert(&mut docs, fields))
    }

    fn create_if_absent(&self, filter: &Filter, fields: T) -> Result<Option<DocId>, StoreError> {
        let mut docs = self.docs.write();
        for doc in docs.iter() {
            if filter.matches(doc)? {
                return Ok(None);
            }
        }
        Ok(Some(self.insert(&mut docs, fields)))
    }

    fn read_one(&self, filter: &Filter, options: FindOptions) -> Result<Option<Doc<T>>, StoreError> {
        let mut matches = self.read_many(filter, options)?;
        Ok(matches.next())
    }

    fn read_many(&self, filter: &Filter, options: FindOptions) -> Result<Docs<T>, StoreError> {
        let docs = self.docs.read();
        let mut matches = Vec::new();
        for doc in docs.iter() {
            if filter.matches(doc)? {
                matches.push(doc.clone());
            }
        }
        drop(docs);
        sort_docs(&mut matches, options.sort);
        Ok(Docs::new(matches))
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> Result<bool, StoreError> {
        let mut docs = self.docs.write();
        for doc in docs.iter_mut() {
            if filter.matches(doc)? {
                let now = next_timestamp(&self.clock);
                apply_update(doc, update, now)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        let mut docs = self.docs.write();
        for (index, doc) in docs.iter().enumerate() {
            if filter.matches(doc)? {
                docs.remove(index);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
