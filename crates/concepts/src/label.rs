use std::sync::Arc;

use doc_store::{
    sanitize_update, Doc, DocId, DocStore, Filter, FindOptions, InMemoryDocStore, Update,
};
use serde::{Deserialize, Serialize};

use crate::error::ConceptError;

const ALLOWED_UPDATES: [&str; 1] = ["name"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabelDoc {
    pub name: String,
    pub target: DocId,
}

/// Free-form (name, target) tuples. Labels carry no owner: anyone may
/// create or delete one, and updates may touch the name only.
pub struct LabelConcept {
    store: Arc<dyn DocStore<LabelDoc>>,
}

impl LabelConcept {
    pub fn new(store: Arc<dyn DocStore<LabelDoc>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryDocStore::shared("post_labels"))
    }

    pub fn create(
        &self,
        name: impl Into<String>,
        target: DocId,
    ) -> Result<Doc<LabelDoc>, ConceptError> {
        let id = self.store.create_one(LabelDoc {
            name: name.into(),
            target,
        })?;
        let doc = self
            .store
            .read_one(&Filter::by_id(id), FindOptions::default())?
            .ok_or_else(|| ConceptError::NotFound(format!("label {id} does not exist")))?;
        Ok(doc)
    }

    /// Arbitrary-filter query, most recently modified first.
    pub fn get_labels(&self, filter: &Filter) -> Result<Vec<Doc<LabelDoc>>, ConceptError> {
        Ok(self.store.read_many(filter, FindOptions::default())?.collect())
    }

    pub fn update(&self, id: DocId, update: &Update) -> Result<(), ConceptError> {
        sanitize_update(update, &ALLOWED_UPDATES)?;
        self.store.update_one(&Filter::by_id(id), update)?;
        Ok(())
    }

    pub fn delete(&self, id: DocId) -> Result<(), ConceptError> {
        self.store.delete_one(&Filter::by_id(id))?;
        Ok(())
    }
}
