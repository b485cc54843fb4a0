pub mod doc;
pub mod error;
pub mod filter;
pub mod sled_store;
pub mod sqlite_store;
pub mod store;
pub mod update;

pub use doc::{Doc, DocId, Record};
pub use error::StoreError;
pub use filter::{Filter, FindOptions, SortOrder};
pub use sled_store::SledDocStore;
pub use sqlite_store::SqliteDocStore;
pub use store::{DocStore, Docs, InMemoryDocStore};
pub use update::{sanitize_update, Update};
