use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Store-managed fields no update may touch, whatever the caller's
/// allow-list says.
pub(crate) const PROTECTED_FIELDS: [&str; 3] = ["id", "created_ms", "updated_ms"];

/// Partial-update payload: a set of record fields to overwrite.
#[derive(Clone, Debug, Default)]
pub struct Update {
    fields: Map<String, Value>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(field.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub(crate) fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Allow-list guard every concept runs before delegating an update to
/// its store. Fails on the first field outside the allow-list and
/// nothing is applied; identity, ownership and creation time never
/// appear in any concept's allow-list.
pub fn sanitize_update(update: &Update, allowed: &[&str]) -> Result<(), StoreError> {
    for field in update.keys() {
        if !allowed.contains(&field) {
            return Err(StoreError::DisallowedField(field.to_string()));
        }
    }
    Ok(())
}
