//! Bearer token sources for upstream requests.

use std::fmt::Debug;
use std::sync::{Arc, RwLock};

// == Token Provider ==
/// Supplies the bearer token attached to each request, if any.
pub trait TokenProvider: Send + Sync + Debug {
    fn bearer_token(&self) -> Option<String>;
}

/// No token: requests go out anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl TokenProvider for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

// == Session Token ==
/// Token held for the lifetime of a login session. Clones share the token, so
/// a login or logout is seen by every client holding one.
#[derive(Debug, Default, Clone)]
pub struct SessionToken {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.filter(|t| !t.is_empty()))),
        }
    }

    /// Stores a new token (login).
    pub fn set(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into()).filter(|t| !t.is_empty());
        }
    }

    /// Forgets the token (logout).
    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

impl TokenProvider for SessionToken {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}
