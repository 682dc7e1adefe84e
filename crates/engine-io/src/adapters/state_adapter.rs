//! # State Adapter
//!
//! In-memory storage for one account and one logic, for testing.
//! Production hosts back `StateDriver` with their account state tree.

use crate::domain::value_objects::{Address, LogicId};
use crate::ports::outbound::StateDriver;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory namespaced storage.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    address: Address,
    logic_id: LogicId,
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Create empty storage for `address` scoped to `logic_id`.
    #[must_use]
    pub fn new(address: Address, logic_id: LogicId) -> Self {
        Self {
            address,
            logic_id,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StateDriver for InMemoryStorage {
    fn address(&self) -> Address {
        self.address
    }

    fn logic_id(&self) -> LogicId {
        self.logic_id
    }

    fn get_storage_entry(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    fn set_storage_entry(&self, key: Vec<u8>, value: Vec<u8>) -> bool {
        self.entries.write().insert(key, value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_get_set() {
        let logic = LogicId::new(Address([1; 32]), 0);
        let storage = InMemoryStorage::new(Address([2; 32]), logic);

        assert!(storage.get_storage_entry(b"k").is_none());
        assert!(!storage.set_storage_entry(b"k".to_vec(), b"v1".to_vec()));
        assert!(storage.set_storage_entry(b"k".to_vec(), b"v2".to_vec()));
        assert_eq!(storage.get_storage_entry(b"k"), Some(b"v2".to_vec()));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.logic_id(), logic);
        assert_eq!(storage.address(), Address([2; 32]));
    }
}
