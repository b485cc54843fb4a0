use serde::Serialize;
use serde_json::{Map, Value};

use crate::doc::{Doc, DocId, Record};
use crate::error::StoreError;

/// Equality match over the document id and/or record fields. An empty
/// filter matches every document in the collection.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    id: Option<DocId>,
    fields: Map<String, Value>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: DocId) -> Self {
        Self {
            id: Some(id),
            fields: Map::new(),
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(field.into(), value);
        self
    }

    pub(crate) fn matches<T: Record>(&self, doc: &Doc<T>) -> Result<bool, StoreError> {
        if let Some(id) = self.id {
            if id != doc.id {
                return Ok(false);
            }
        }
        if self.fields.is_empty() {
            return Ok(true);
        }
        let value = serde_json::to_value(&doc.fields)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let Value::Object(map) = value else {
            return Ok(false);
        };
        Ok(self
            .fields
            .iter()
            .all(|(field, expected)| map.get(field) == Some(expected)))
    }
}

/// Sort order for reads. Concepts uniformly query
/// most-recently-modified first.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    UpdatedDesc,
    UpdatedAsc,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FindOptions {
    pub sort: SortOrder,
}
