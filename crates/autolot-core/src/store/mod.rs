//! Persisted session storage.
//!
//! This module provides:
//! - `KeyValueStore`: the durable key-value port the session lives in
//! - `MemoryStore`, `FileStore`, `KeyringStore`: its implementations
//! - `SessionStore`: typed access to the three session keys
//!
//! The store has no expiry logic of its own. Whether a stored session is
//! still usable is decided by the auth layer when it loads it.

pub mod file;
pub mod keychain;
pub mod memory;
pub mod session;

use thiserror::Error;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;
pub use self::session::{PersistedSession, SessionLoad, SessionStore};

/// The fixed set of keys a session occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    AccessToken,
    RefreshToken,
    User,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::AccessToken,
        StorageKey::RefreshToken,
        StorageKey::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AccessToken => "access_token",
            StorageKey::RefreshToken => "refresh_token",
            StorageKey::User => "user",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain access failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string storage surviving restarts within one user profile.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StorageKey) -> Option<String>;

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: StorageKey) -> Result<(), StoreError>;
}
