use std::sync::Arc;

use doc_store::{
    sanitize_update, Doc, DocId, DocStore, Filter, FindOptions, InMemoryDocStore, Update,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConceptError;

pub const DEFAULT_EMOJI: &str = "none";

const ALLOWED_UPDATES: [&str; 1] = ["emoji"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusDoc {
    pub user: DocId,
    pub emoji: String,
}

/// One soft-deletable status record per user. "Delete" resets the
/// emoji to the default instead of removing the document, so a status
/// identity is stable for the life of the user.
pub struct StatusConcept {
    store: Arc<dyn DocStore<StatusDoc>>,
}

impl StatusConcept {
    pub fn new(store: Arc<dyn DocStore<StatusDoc>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryDocStore::shared("status"))
    }

    /// Creates the user's status record with the default emoji. A user
    /// has at most one record; a second create is rejected.
    pub fn create(&self, user: DocId) -> Result<Doc<StatusDoc>, ConceptError> {
        let created = self.store.create_if_absent(
            &Filter::all().eq("user", user),
            StatusDoc {
                user,
                emoji: DEFAULT_EMOJI.to_string(),
            },
        )?;
        let Some(id) = created else {
            return Err(ConceptError::NotAuthorized(format!(
                "{user} already has a status"
            )));
        };
        debug!(%user, "status created");
        let doc = self
            .store
            .read_one(&Filter::by_id(id), FindOptions::default())?
            .ok_or_else(|| ConceptError::NotFound(format!("status {id} does not exist")))?;
        Ok(doc)
    }

    pub fn get_status(&self, filter: &Filter) -> Result<Vec<Doc<StatusDoc>>, ConceptError> {
        Ok(self.store.read_many(filter, FindOptions::default())?.collect())
    }

    pub fn get_by_author(&self, user: DocId) -> Result<Vec<Doc<StatusDoc>>, ConceptError> {
        self.get_status(&Filter::all().eq("user", user))
    }

    pub fn update(&self, id: DocId, emoji: impl Into<String>) -> Result<(), ConceptError> {
        let update = Update::new().set("emoji", emoji.into());
        sanitize_update(&update, &ALLOWED_UPDATES)?;
        self.store.update_one(&Filter::by_id(id), &update)?;
        Ok(())
    }

    /// Soft delete: resets the emoji, keeps the record and its identity.
    pub fn delete(&self, id: DocId) -> Result<(), ConceptError> {
        self.update(id, DEFAULT_EMOJI)
    }

    /// Ownership gate the dispatch layer runs before any mutating route:
    /// not-found for an unknown record, not-authorized when the caller
    /// is not the recorded user.
    pub fn is_author(&self, user: DocId, id: DocId) -> Result<(), ConceptError> {
        let doc = self
            .store
            .read_one(&Filter::by_id(id), FindOptions::default())?
            .ok_or_else(|| ConceptError::NotFound(format!("status {id} does not exist")))?;
        if doc.fields.user != user {
            return Err(ConceptError::not_owner(user, id));
        }
        Ok(())
    }
}
