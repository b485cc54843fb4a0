use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use doc_store::{
    sanitize_update, Doc, DocId, DocStore, Filter, FindOptions, InMemoryDocStore, Update,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConceptError;

const ALLOWED_UPDATES: [&str; 1] = ["expire"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpiryDoc {
    pub resource: DocId,
    /// Absolute expiry instant, epoch milliseconds.
    pub expire: i64,
}

/// Attaches a time-to-live to an arbitrary resource reference.
///
/// Sign convention: `get_time_left` returns `expire - now`, so a
/// positive value means the record is still active and zero or
/// negative means the deadline has passed. `expire()` consumes the
/// record only on the elapsed branch; there is no background sweep and
/// no persisted "expired" flag.
pub struct ExpiryConcept {
    store: Arc<dyn DocStore<ExpiryDoc>>,
}

impl ExpiryConcept {
    pub fn new(store: Arc<dyn DocStore<ExpiryDoc>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryDocStore::shared("expire_session"))
    }

    /// Starts a timer for the resource. Several timers may exist for
    /// the same resource at once; callers wanting a single active timer
    /// query before creating.
    pub fn create(
        &self,
        resource: DocId,
        duration_seconds: u64,
    ) -> Result<Doc<ExpiryDoc>, ConceptError> {
        if duration_seconds == 0 {
            return Err(ConceptError::InvalidInput(
                "duration cannot be zero".to_string(),
            ));
        }
        let expire = Self::now_ms() + duration_seconds as i64 * 1000;
        let id = self.store.create_one(ExpiryDoc { resource, expire })?;
        debug!(%id, %resource, expire, "expiry created");
        let doc = self
            .store
            .read_one(&Filter::by_id(id), FindOptions::default())?
            .ok_or_else(|| ConceptError::NotFound(format!("expiry {id} does not exist")))?;
        Ok(doc)
    }

    /// Milliseconds until the most-recently-modified match elapses; may
    /// be zero or negative when it already has. A query, never a
    /// mutation.
    pub fn get_time_left(&self, filter: &Filter) -> Result<i64, ConceptError> {
        let doc = self
            .store
            .read_one(filter, FindOptions::default())?
            .ok_or_else(|| ConceptError::NotFound("no expiry matches the query".to_string()))?;
        Ok(doc.fields.expire - Self::now_ms())
    }

    /// Absolute reset of the expiry instant, not additive. A no-op when
    /// the identity is unknown.
    pub fn refresh(&self, id: DocId, duration_seconds: u64) -> Result<(), ConceptError> {
        if duration_seconds == 0 {
            return Err(ConceptError::InvalidInput(
                "duration cannot be zero".to_string(),
            ));
        }
        let update = Update::new().set("expire", Self::now_ms() + duration_seconds as i64 * 1000);
        sanitize_update(&update, &ALLOWED_UPDATES)?;
        self.store.update_one(&Filter::by_id(id), &update)?;
        Ok(())
    }

    /// Checks whether the timer has elapsed; if so, removes the record
    /// and returns `true`. Consumption is terminal: a later
    /// `get_time_left` for the same identity is not-found.
    pub fn expire(&self, id: DocId) -> Result<bool, ConceptError> {
        let time_left = self.get_time_left(&Filter::by_id(id))?;
        if time_left <= 0 {
            self.store.delete_one(&Filter::by_id(id))?;
            debug!(%id, "expiry consumed");
            return Ok(true);
        }
        Ok(false)
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}
