//! Session credential storage.
//!
//! The server hands out an opaque token at login and expects it back
//! verbatim in the `Authorization` header of every later call. The domain
//! never threads the token through individual operations, so the transport
//! keeps it in a [`TokenStore`] it consults per request.

use std::sync::{Mutex, MutexGuard, PoisonError};
use voa_booking::AuthToken;

/// Where the session credential lives between requests.
///
/// [`InMemoryTokenStore`] suffices for a single-process client; an embedder
/// that persists sessions (browser storage, keychain) supplies its own
/// implementation.
pub trait TokenStore: Send + Sync {
    /// Replaces the stored credential.
    fn store(&self, token: AuthToken);

    /// Returns the current credential, if any.
    fn token(&self) -> Option<AuthToken>;

    /// Discards the stored credential.
    fn clear(&self);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local [`TokenStore`].
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl InMemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn store(&self, token: AuthToken) {
        *lock(&self.token) = Some(token);
    }

    fn token(&self) -> Option<AuthToken> {
        lock(&self.token).clone()
    }

    fn clear(&self) {
        *lock(&self.token) = None;
    }
}
