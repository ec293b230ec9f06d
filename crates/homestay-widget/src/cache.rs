use serde_json::Value;

use crate::storage::LocalStore;

pub const FAVOURITES_KEY: &str = "favourites";

/// Favourited listing ids, persisted through a [`LocalStore`] with an
/// in-memory copy used whenever the store fails.
#[derive(Debug)]
pub struct FavouritesCache<S> {
    store: S,
    memory: Vec<String>,
}

impl<S: LocalStore> FavouritesCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            memory: Vec::new(),
        }
    }

    /// Current favourites. Corrupt or non-array content reads as empty.
    pub fn read(&mut self) -> Vec<String> {
        match self.store.get(FAVOURITES_KEY) {
            Ok(stored) => {
                let favourites = stored.as_deref().map(parse).unwrap_or_default();
                self.memory = favourites.clone();
                favourites
            }
            Err(e) => {
                tracing::warn!("Local storage blocked, using memory cache: {e}");
                self.memory.clone()
            }
        }
    }

    pub fn write(&mut self, favourites: Vec<String>) {
        let raw = serde_json::to_string(&favourites).unwrap_or_else(|_| "[]".to_string());
        self.memory = favourites;
        if let Err(e) = self.store.set(FAVOURITES_KEY, &raw) {
            tracing::warn!("Local storage blocked, falling back to memory cache: {e}");
        }
    }

    pub fn contains(&mut self, listing_id: &str) -> bool {
        self.read().iter().any(|id| id == listing_id)
    }

    /// Record membership, keeping ids unique.
    pub fn set_membership(&mut self, listing_id: &str, favourite: bool) {
        let mut favourites = self.read();
        if favourite {
            if !favourites.iter().any(|id| id == listing_id) {
                favourites.push(listing_id.to_string());
            }
        } else {
            favourites.retain(|id| id != listing_id);
        }
        self.write(favourites);
    }
}

fn parse(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    struct BlockedStore;

    impl LocalStore for BlockedStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("blocked by policy".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("blocked by policy".into()))
        }
    }

    #[test]
    fn corrupt_or_non_array_content_reads_empty() {
        for raw in ["not json", "{\"a\":1}", "\"x\"", "null"] {
            let mut store = MemoryStore::new();
            store.set(FAVOURITES_KEY, raw).unwrap();
            let mut cache = FavouritesCache::new(store);
            assert!(cache.read().is_empty(), "{raw}");
        }
    }

    #[test]
    fn writes_reach_the_store() {
        let mut cache = FavouritesCache::new(MemoryStore::new());
        cache.set_membership("a", true);
        cache.set_membership("b", true);
        cache.set_membership("a", true);
        assert_eq!(cache.read(), vec!["a".to_string(), "b".to_string()]);

        cache.set_membership("b", false);
        assert_eq!(cache.store.get(FAVOURITES_KEY).unwrap().as_deref(), Some("[\"a\"]"));
    }

    #[test]
    fn blocked_storage_falls_back_to_memory() {
        let mut cache = FavouritesCache::new(BlockedStore);
        assert!(cache.read().is_empty());
        cache.set_membership("a", true);
        assert!(cache.contains("a"));
        cache.set_membership("a", false);
        assert!(!cache.contains("a"));
    }
}
