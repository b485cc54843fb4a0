use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot update protected '{0}' field")]
    ProtectedField(String),
    #[error("cannot update '{0}' field")]
    DisallowedField(String),
    #[error("unknown field '{0}' for this collection")]
    UnknownField(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("store error: {0}")]
    Backend(String),
}
