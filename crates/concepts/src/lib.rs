pub mod error;
pub mod expiry;
pub mod label;
pub mod permission;
pub mod session;
pub mod status;

pub use error::ConceptError;
pub use expiry::{ExpiryConcept, ExpiryDoc};
pub use label::{LabelConcept, LabelDoc};
pub use permission::{PermissionConcept, PermissionDoc};
pub use session::{InMemorySessionStore, SessionStore};
pub use status::{StatusConcept, StatusDoc, DEFAULT_EMOJI};
