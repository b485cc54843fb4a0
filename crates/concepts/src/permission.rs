use std::sync::Arc;

use doc_store::{Doc, DocId, DocStore, Filter, FindOptions, InMemoryDocStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConceptError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PermissionDoc {
    pub user: DocId,
    pub resource: DocId,
}

/// Grant relation between users and resources: a set of
/// (user, resource) pairs, each with a stable identity.
pub struct PermissionConcept {
    store: Arc<dyn DocStore<PermissionDoc>>,
}

impl PermissionConcept {
    pub fn new(store: Arc<dyn DocStore<PermissionDoc>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryDocStore::shared("perms"))
    }

    fn pair(user: DocId, resource: DocId) -> Filter {
        Filter::all().eq("user", user).eq("resource", resource)
    }

    /// Grants `user` access to `resource`. Uniqueness of the pair is
    /// enforced with a single conditional insert, so concurrent callers
    /// cannot both create the grant.
    pub fn grant_permission(
        &self,
        user: DocId,
        resource: DocId,
    ) -> Result<Doc<PermissionDoc>, ConceptError> {
        let created = self
            .store
            .create_if_absent(&Self::pair(user, resource), PermissionDoc { user, resource })?;
        let Some(id) = created else {
            return Err(ConceptError::already_granted(user, resource));
        };
        debug!(%user, %resource, "permission granted");
        let doc = self
            .store
            .read_one(&Filter::by_id(id), FindOptions::default())?
            .ok_or_else(|| ConceptError::NotFound(format!("permission {id} does not exist")))?;
        Ok(doc)
    }

    pub fn get_perms(&self, filter: &Filter) -> Result<Vec<Doc<PermissionDoc>>, ConceptError> {
        Ok(self.store.read_many(filter, FindOptions::default())?.collect())
    }

    pub fn get_by_user(&self, user: DocId) -> Result<Vec<Doc<PermissionDoc>>, ConceptError> {
        self.get_perms(&Filter::all().eq("user", user))
    }

    pub fn get_by_resource(&self, resource: DocId) -> Result<Vec<Doc<PermissionDoc>>, ConceptError> {
        self.get_perms(&Filter::all().eq("resource", resource))
    }

    pub fn get_specific(
        &self,
        user: DocId,
        resource: DocId,
    ) -> Result<Option<Doc<PermissionDoc>>, ConceptError> {
        Ok(self
            .store
            .read_one(&Self::pair(user, resource), FindOptions::default())?)
    }

    /// Revokes by grant identity; revoking an unknown grant is a no-op.
    pub fn remove_permission(&self, id: DocId) -> Result<(), ConceptError> {
        self.store.delete_one(&Filter::by_id(id))?;
        Ok(())
    }

    /// Revokes by exact pair; absent pairs are a no-op.
    pub fn revoke_specific(&self, user: DocId, resource: DocId) -> Result<(), ConceptError> {
        self.store.delete_one(&Self::pair(user, resource))?;
        Ok(())
    }
}
