use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::memory::MemoryPieceStore;
use super::StoreHandle;

/// Session-wide registry of per-torrent memory stores.
///
/// Streaming sessions look up their torrent's store here to obtain the
/// [`StoreHandle`] handed to a [`LookbehindManager`](crate::LookbehindManager).
pub struct StoreRegistry {
    stores: DashMap<String, Arc<MemoryPieceStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: DashMap::new(),
        }
    }

    /// Registers a torrent's store, replacing any previous one.
    pub fn register(&self, info_hash: String, store: Arc<MemoryPieceStore>) {
        debug!("Registered memory store for {}", info_hash);
        self.stores.insert(info_hash, store);
    }

    pub fn unregister(&self, info_hash: &str) -> Option<Arc<MemoryPieceStore>> {
        self.stores.remove(info_hash).map(|(_, store)| store)
    }

    /// The concrete store for a torrent.
    pub fn get(&self, info_hash: &str) -> Option<Arc<MemoryPieceStore>> {
        self.stores.get(info_hash).map(|entry| Arc::clone(entry.value()))
    }

    /// An opaque protection handle for a torrent, `None` if unknown.
    pub fn handle(&self, info_hash: &str) -> Option<StoreHandle> {
        self.get(info_hash).map(|store| store as StoreHandle)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PieceStore;

    #[test]
    fn test_register_and_lookup() {
        let registry = StoreRegistry::new();
        let store = MemoryPieceStore::new(16384, 10, 0);
        registry.register("abc".to_string(), Arc::clone(&store));

        assert_eq!(registry.len(), 1);
        let handle = registry.handle("abc").unwrap();
        handle.set_protected_pieces(&[1, 2]);
        assert_eq!(store.protected_count(), 2);

        assert!(registry.handle("missing").is_none());
    }

    #[test]
    fn test_unregister() {
        let registry = StoreRegistry::new();
        registry.register("abc".to_string(), MemoryPieceStore::new(16384, 10, 0));
        assert!(registry.unregister("abc").is_some());
        assert!(registry.is_empty());
        assert!(registry.unregister("abc").is_none());
    }
}
