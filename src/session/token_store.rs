//! Persisted bearer token and user snapshot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The credential pair is the only state that survives a reload. It is written
//! by login, read by the bootstrapper and the interceptor, and cleared by
//! logout and invalidation. Nothing else writes it.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::rc::Rc;

use crate::net::types::UserRecord;
use crate::util::storage::{KeyValueStore, StorageError};

/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "authToken";
/// Storage key of the JSON user snapshot.
pub const USER_KEY: &str = "user";

/// What a previous page load left behind. Either field may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedCredentials {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
}

/// Token + user snapshot persistence over a [`KeyValueStore`].
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self { backend: Rc::new(backend) }
    }

    /// Persist both halves of the credential pair.
    ///
    /// The snapshot is serialized before anything is written, and a failed
    /// token write removes the snapshot again, so a failure leaves neither.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if serialization or either write fails.
    pub fn save(&self, token: &str, user: &UserRecord) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(user).map_err(|e| StorageError::Serialize {
            key: USER_KEY.to_owned(),
            reason: e.to_string(),
        })?;
        self.backend.set(USER_KEY, &snapshot)?;
        if let Err(err) = self.backend.set(TOKEN_KEY, token) {
            self.backend.remove(USER_KEY);
            log::warn!("token write failed, snapshot rolled back: {err}");
            return Err(err);
        }
        log::debug!("credentials saved for user {}", user.id);
        Ok(())
    }

    /// Read the persisted pair. A corrupt or missing snapshot reads as `None`.
    #[must_use]
    pub fn load(&self) -> PersistedCredentials {
        let user = self.backend.get(USER_KEY).and_then(|raw| {
            serde_json::from_str::<UserRecord>(&raw)
                .map_err(|e| log::warn!("discarding unreadable user snapshot: {e}"))
                .ok()
        });
        PersistedCredentials { token: self.token(), user }
    }

    /// Current bearer token, if any. Empty strings count as absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.backend.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    /// Drop only the user snapshot, keeping the token.
    pub fn forget_user(&self) {
        self.backend.remove(USER_KEY);
    }

    /// Remove both keys. Safe to call repeatedly.
    pub fn clear(&self) {
        self.backend.remove(TOKEN_KEY);
        self.backend.remove(USER_KEY);
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}
