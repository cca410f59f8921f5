//! OS keychain backed session storage.

use keyring::Entry;

use super::{KeyValueStore, StorageKey, StoreError};

const SERVICE_NAME: &str = "autolot";

/// One keychain entry per session key, under a shared service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: StorageKey) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, key.as_str())?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entry(key).ok()?.get_password().ok()
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
