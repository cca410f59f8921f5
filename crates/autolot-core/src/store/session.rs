//! Typed access to the three session keys.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{TokenPair, UserRecord};

use super::{KeyValueStore, StorageKey, StoreError};

/// A complete session as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub tokens: TokenPair,
    pub user: UserRecord,
}

/// Outcome of reading the session keys.
#[derive(Debug)]
pub enum SessionLoad {
    /// Nothing stored
    Empty,
    /// All three keys present and the user record parsed
    Complete(PersistedSession),
    /// Some keys present, some missing
    Partial,
    /// All keys present but the user record does not parse
    Corrupt(serde_json::Error),
}

/// Session view over a `KeyValueStore`.
/// Clone is cheap and clones share the underlying store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.get(StorageKey::AccessToken)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.get(StorageKey::RefreshToken)
    }

    /// Stored user record, `Ok(None)` when the key is absent.
    pub fn user(&self) -> Result<Option<UserRecord>, StoreError> {
        match self.inner.get(StorageKey::User) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn load(&self) -> SessionLoad {
        let access = self.access_token();
        let refresh = self.refresh_token();
        let user = self.inner.get(StorageKey::User);

        match (access, refresh, user) {
            (None, None, None) => SessionLoad::Empty,
            (Some(access_token), Some(refresh_token), Some(raw_user)) => {
                match serde_json::from_str(&raw_user) {
                    Ok(user) => SessionLoad::Complete(PersistedSession {
                        tokens: TokenPair {
                            access_token,
                            refresh_token,
                        },
                        user,
                    }),
                    Err(e) => SessionLoad::Corrupt(e),
                }
            }
            _ => SessionLoad::Partial,
        }
    }

    /// Write all three keys. A failed write clears whatever was written so
    /// no partial session is left behind.
    pub fn save(&self, tokens: &TokenPair, user: &UserRecord) -> Result<(), StoreError> {
        let result = serde_json::to_string(user)
            .map_err(StoreError::from)
            .and_then(|user_json| {
                self.inner.set(StorageKey::AccessToken, &tokens.access_token)?;
                self.inner.set(StorageKey::RefreshToken, &tokens.refresh_token)?;
                self.inner.set(StorageKey::User, &user_json)
            });

        if let Err(ref e) = result {
            warn!(error = %e, "Failed to persist session, clearing partial state");
            self.clear();
        } else {
            debug!(user_id = %user.id, "Session persisted");
        }
        result
    }

    /// Remove all three keys. Individual failures are logged and skipped.
    pub fn clear(&self) {
        for key in StorageKey::ALL {
            if let Err(e) = self.inner.remove(key) {
                warn!(key = key.as_str(), error = %e, "Failed to remove session key");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        StorageKey::ALL.iter().all(|key| self.inner.get(*key).is_none())
    }
}
