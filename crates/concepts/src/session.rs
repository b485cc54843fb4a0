use std::collections::HashMap;
use std::sync::Arc;

use doc_store::DocId;
use parking_lot::Mutex;

use crate::error::ConceptError;

/// Binding between opaque session tokens and user identities. The
/// dispatch layer owns session lifecycle; concepts only ever receive
/// the resolved `DocId`, never a token.
pub trait SessionStore: Send + Sync {
    /// Binds the session to a user; fails when it is already bound.
    fn start(&self, session: &str, user: DocId) -> Result<(), ConceptError>;

    /// Resolves the session to its user; fails when nobody is logged in.
    fn get_user(&self, session: &str) -> Result<DocId, ConceptError>;

    /// Removes the binding; ending an unbound session is a no-op.
    fn end(&self, session: &str);

    /// Guard for login-like routes: fails when a user is logged in.
    fn is_logged_out(&self, session: &str) -> Result<(), ConceptError>;
}

pub struct InMemorySessionStore {
    bindings: Mutex<HashMap<String, DocId>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            bindings: Mutex::new(HashMap::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn start(&self, session: &str, user: DocId) -> Result<(), ConceptError> {
        let mut bindings = self.bindings.lock();
        if bindings.contains_key(session) {
            return Err(ConceptError::NotAuthorized(
                "session already has a logged-in user".to_string(),
            ));
        }
        bindings.insert(session.to_string(), user);
        Ok(())
    }

    fn get_user(&self, session: &str) -> Result<DocId, ConceptError> {
        self.bindings
            .lock()
            .get(session)
            .copied()
            .ok_or_else(|| ConceptError::NotAuthorized("must be logged in".to_string()))
    }

    fn end(&self, session: &str) {
        self.bindings.lock().remove(session);
    }

    fn is_logged_out(&self, session: &str) -> Result<(), ConceptError> {
        if self.bindings.lock().contains_key(session) {
            return Err(ConceptError::NotAuthorized(
                "must be logged out".to_string(),
            ));
        }
        Ok(())
    }
}
