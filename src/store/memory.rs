//! In-memory backend: two maps behind one lock.
//!
//! Development and test backend.  Both namespaces live in a single
//! [`RwLock`]-guarded struct, which makes `delete` atomic across them — the
//! one place the two-namespace contract benefits from a shared lock.
//! Nothing survives the process.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::fragment::Fragment;
use crate::store::{FragmentStore, StoreError};

type Key = (String, String);

#[derive(Default)]
struct Shelves {
    metadata: HashMap<Key, Fragment>,
    data:     HashMap<Key, Vec<u8>>,
}

/// Process-local [`FragmentStore`] backend.
#[derive(Default)]
pub struct MemoryStore {
    shelves: RwLock<Shelves>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a writer panicked mid-operation; the maps
    // themselves are still structurally sound, so we keep serving.
    fn read(&self) -> RwLockReadGuard<'_, Shelves> {
        self.shelves.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shelves> {
        self.shelves.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn key(owner_id: &str, id: &str) -> Key {
    (owner_id.to_owned(), id.to_owned())
}

impl FragmentStore for MemoryStore {
    fn write_metadata(&self, meta: &Fragment) -> Result<(), StoreError> {
        self.write()
            .metadata
            .insert(key(&meta.owner_id, &meta.id), meta.clone());
        Ok(())
    }

    fn read_metadata(&self, owner_id: &str, id: &str) -> Result<Fragment, StoreError> {
        self.read()
            .metadata
            .get(&key(owner_id, id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()
            .metadata
            .keys()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, id)| id.clone())
            .collect())
    }

    fn list_metadata(&self, owner_id: &str) -> Result<Vec<Fragment>, StoreError> {
        Ok(self
            .read()
            .metadata
            .iter()
            .filter(|((owner, _), _)| owner == owner_id)
            .map(|(_, meta)| meta.clone())
            .collect())
    }

    fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StoreError> {
        self.write().data.insert(key(owner_id, id), data.to_vec());
        Ok(())
    }

    fn read_data(&self, owner_id: &str, id: &str) -> Result<Vec<u8>, StoreError> {
        self.read()
            .data
            .get(&key(owner_id, id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let mut shelves = self.write();
        let k = key(owner_id, id);
        let had_meta = shelves.metadata.remove(&k).is_some();
        let had_data = shelves.data.remove(&k).is_some();
        if had_meta || had_data {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Fragment;

    fn sample(owner: &str) -> Fragment {
        Fragment::new(owner, "text/plain").unwrap()
    }

    #[test]
    fn metadata_roundtrip() {
        let store = MemoryStore::new();
        let meta = sample("user123");

        store.write_metadata(&meta).unwrap();
        let read = store.read_metadata(&meta.owner_id, &meta.id).unwrap();
        assert_eq!(read, meta);
    }

    #[test]
    fn data_roundtrip() {
        let store = MemoryStore::new();
        store.write_data("user123", "frag456", b"Sample data").unwrap();
        assert_eq!(store.read_data("user123", "frag456").unwrap(), b"Sample data");
    }

    #[test]
    fn missing_reads_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.read_metadata("user123", "nope"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.read_data("user123", "nope"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn delete_removes_both_namespaces() {
        let store = MemoryStore::new();
        let meta = sample("user123");
        store.write_metadata(&meta).unwrap();
        store.write_data(&meta.owner_id, &meta.id, b"payload").unwrap();

        store.delete(&meta.owner_id, &meta.id).unwrap();

        assert!(matches!(
            store.read_metadata(&meta.owner_id, &meta.id),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.read_data(&meta.owner_id, &meta.id),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn delete_with_one_half_present_succeeds() {
        let store = MemoryStore::new();
        // Data only, no metadata record.
        store.write_data("user123", "orphan", b"bytes").unwrap();
        store.delete("user123", "orphan").unwrap();
    }

    #[test]
    fn delete_with_nothing_present_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete("user123", "ghost"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn listing_is_scoped_to_one_owner() {
        let store = MemoryStore::new();
        let a = sample("alice");
        let b = sample("bob");
        store.write_metadata(&a).unwrap();
        store.write_metadata(&b).unwrap();

        let ids = store.list_ids("alice").unwrap();
        assert_eq!(ids, vec![a.id.clone()]);

        let metas = store.list_metadata("bob").unwrap();
        assert_eq!(metas, vec![b]);

        assert!(store.list_ids("carol").unwrap().is_empty());
    }

    #[test]
    fn overwrite_replaces_data() {
        let store = MemoryStore::new();
        store.write_data("user123", "frag", b"first").unwrap();
        store.write_data("user123", "frag", b"second").unwrap();
        assert_eq!(store.read_data("user123", "frag").unwrap(), b"second");
    }
}
