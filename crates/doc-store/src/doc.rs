use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shape of the concept-specific fields a store persists. Blanket
/// implemented; concepts only derive serde on their record structs.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

impl<T> Record for T where T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

/// Store-generated identity of a document. Unique process-wide,
/// assigned once at creation and never reassigned.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(Uuid);

impl DocId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(value)?))
    }
}

/// One persisted document: store-managed identity and timestamps plus
/// the concept's own fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Doc<T> {
    pub id: DocId,
    pub created_ms: i64,
    pub updated_ms: i64,
    pub fields: T,
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
