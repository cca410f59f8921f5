use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StorageKey, StoreError};

/// In-process store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned()
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set(StorageKey::AccessToken, "A").unwrap();
        assert_eq!(store.get(StorageKey::AccessToken).as_deref(), Some("A"));
        assert_eq!(store.get(StorageKey::RefreshToken), None);

        store.set(StorageKey::AccessToken, "B").unwrap();
        assert_eq!(store.get(StorageKey::AccessToken).as_deref(), Some("B"));

        store.remove(StorageKey::AccessToken).unwrap();
        assert!(store.is_empty());

        // Removing an absent key is fine
        store.remove(StorageKey::User).unwrap();
    }
}
