use doc_store::{DocId, StoreError};
use thiserror::Error;

/// Failure taxonomy shared by every concept. All three variants are
/// reported synchronously to the immediate caller; none is retried or
/// swallowed here.
#[derive(Debug, Error)]
pub enum ConceptError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ConceptError {
    pub fn already_granted(user: DocId, resource: DocId) -> Self {
        Self::NotAuthorized(format!(
            "{user} has already been granted permission to {resource}"
        ))
    }

    pub fn not_owner(user: DocId, id: DocId) -> Self {
        Self::NotAuthorized(format!("{user} is not the user of {id}"))
    }
}

impl From<StoreError> for ConceptError {
    fn from(err: StoreError) -> Self {
        match err {
            // A rejected update field is a policy violation, not a
            // storage fault.
            StoreError::DisallowedField(_) | StoreError::ProtectedField(_) => {
                ConceptError::NotAuthorized(err.to_string())
            }
            other => ConceptError::Store(other.to_string()),
        }
    }
}
