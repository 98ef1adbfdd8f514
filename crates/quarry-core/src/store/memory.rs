use crate::{
    key::Key,
    store::{OrderedCollection, StorageEngine, StorageTxn, StoreCursor, StoreEntry, StoreError},
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    ops::Bound,
};

///
/// MemoryCollection
///

#[derive(Clone, Debug, Default)]
pub struct MemoryCollection {
    entries: BTreeMap<Key, Vec<u8>>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: Key, value: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &Key) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }
}

impl OrderedCollection for MemoryCollection {
    fn cursor(&self) -> Result<Box<dyn StoreCursor + '_>, StoreError> {
        Ok(Box::new(MemoryCursor {
            entries: &self.entries,
            current: None,
        }))
    }

    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }
}

///
/// MemoryCursor
///

struct MemoryCursor<'a> {
    entries: &'a BTreeMap<Key, Vec<u8>>,
    current: Option<StoreEntry>,
}

impl MemoryCursor<'_> {
    fn land(&mut self, found: Option<(&Key, &Vec<u8>)>) -> Option<StoreEntry> {
        self.current = found.map(|(key, value)| StoreEntry {
            key: key.clone(),
            value: value.clone(),
        });

        self.current.clone()
    }
}

impl StoreCursor for MemoryCursor<'_> {
    fn seek(&mut self, key: &Key) -> Result<Option<StoreEntry>, StoreError> {
        let entries = self.entries;
        let found = entries
            .range::<Key, _>((Bound::Included(key), Bound::Unbounded))
            .next();

        Ok(self.land(found))
    }

    fn seek_first(&mut self) -> Result<Option<StoreEntry>, StoreError> {
        let entries = self.entries;

        Ok(self.land(entries.iter().next()))
    }

    fn seek_last(&mut self) -> Result<Option<StoreEntry>, StoreError> {
        let entries = self.entries;

        Ok(self.land(entries.iter().next_back()))
    }

    fn next(&mut self) -> Result<Option<StoreEntry>, StoreError> {
        let entries = self.entries;
        let Some(current) = &self.current else {
            return Ok(None);
        };
        let found = entries
            .range::<Key, _>((Bound::Excluded(&current.key), Bound::Unbounded))
            .next();

        Ok(self.land(found))
    }

    fn prev(&mut self) -> Result<Option<StoreEntry>, StoreError> {
        let entries = self.entries;
        let Some(current) = &self.current else {
            return Ok(None);
        };
        let found = entries
            .range::<Key, _>((Bound::Unbounded, Bound::Excluded(&current.key)))
            .next_back();

        Ok(self.land(found))
    }

    fn current(&self) -> Option<&StoreEntry> {
        self.current.as_ref()
    }
}

///
/// MemoryEngine
///
/// Snapshot-isolated in-memory engine. A transaction copies every collection
/// on begin; commit installs the copy unless another commit landed first.
///

#[derive(Debug, Default)]
pub struct MemoryEngine {
    collections: RefCell<BTreeMap<String, MemoryCollection>>,
    version: Cell<u64>,
}

impl MemoryEngine {
    /// Engine holding one empty collection per name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collections = names
            .into_iter()
            .map(|name| (name.into(), MemoryCollection::new()))
            .collect();

        Self {
            collections: RefCell::new(collections),
            version: Cell::new(0),
        }
    }

    /// Committed entry count of one collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> Option<usize> {
        self.collections.borrow().get(collection).map(MemoryCollection::len)
    }
}

impl StorageEngine for MemoryEngine {
    fn begin_txn(&self) -> Result<Box<dyn StorageTxn + '_>, StoreError> {
        Ok(Box::new(MemoryTxn {
            engine: self,
            snapshot: self.collections.borrow().clone(),
            base_version: self.version.get(),
            dirty: false,
        }))
    }
}

///
/// MemoryTxn
///

struct MemoryTxn<'e> {
    engine: &'e MemoryEngine,
    snapshot: BTreeMap<String, MemoryCollection>,
    base_version: u64,
    dirty: bool,
}

impl MemoryTxn<'_> {
    fn collection_mut(&mut self, name: &str) -> Result<&mut MemoryCollection, StoreError> {
        self.snapshot
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownCollection {
                name: name.to_string(),
            })
    }
}

impl StorageTxn for MemoryTxn<'_> {
    fn collection(&self, name: &str) -> Result<&dyn OrderedCollection, StoreError> {
        self.snapshot
            .get(name)
            .map(|c| c as &dyn OrderedCollection)
            .ok_or_else(|| StoreError::UnknownCollection {
                name: name.to_string(),
            })
    }

    fn put(&mut self, collection: &str, key: Key, value: Vec<u8>) -> Result<(), StoreError> {
        self.collection_mut(collection)?.insert(key, value);
        self.dirty = true;

        Ok(())
    }

    fn delete(&mut self, collection: &str, key: &Key) -> Result<bool, StoreError> {
        let removed = self.collection_mut(collection)?.remove(key).is_some();
        self.dirty |= removed;

        Ok(removed)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if self.engine.version.get() != self.base_version {
            return Err(StoreError::Conflict);
        }

        *self.engine.collections.borrow_mut() = self.snapshot;
        self.engine.version.set(self.base_version.saturating_add(1));

        Ok(())
    }

    fn abort(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn k(bytes: &[u8]) -> Key {
        Key::from_bytes(bytes.to_vec())
    }

    fn keys_of(entries: &[Option<StoreEntry>]) -> Vec<Option<Vec<u8>>> {
        entries
            .iter()
            .map(|e| e.as_ref().map(|e| e.key.as_bytes().to_vec()))
            .collect()
    }

    fn populated() -> MemoryCollection {
        let mut c = MemoryCollection::new();
        for byte in [2u8, 4, 6] {
            c.insert(k(&[byte]), vec![byte]);
        }
        c
    }

    #[test]
    fn seek_lands_on_first_key_not_below_target() {
        let c = populated();
        let mut cursor = c.cursor().expect("cursor");

        let landed = [
            cursor.seek(&k(&[3])).expect("seek"),
            cursor.seek(&k(&[4])).expect("seek"),
            cursor.seek(&k(&[7])).expect("seek"),
        ];

        assert_eq!(keys_of(&landed), [Some(vec![4]), Some(vec![4]), None]);
        assert!(cursor.current().is_none());
    }

    #[test]
    fn next_and_prev_walk_both_directions() {
        let c = populated();
        let mut cursor = c.cursor().expect("cursor");

        let walk = [
            cursor.seek_first().expect("first"),
            cursor.next().expect("next"),
            cursor.next().expect("next"),
            cursor.next().expect("next"),
        ];
        assert_eq!(keys_of(&walk), [Some(vec![2]), Some(vec![4]), Some(vec![6]), None]);

        let back = [
            cursor.seek_last().expect("last"),
            cursor.prev().expect("prev"),
            cursor.prev().expect("prev"),
            cursor.prev().expect("prev"),
        ];
        assert_eq!(keys_of(&back), [Some(vec![6]), Some(vec![4]), Some(vec![2]), None]);
    }

    #[test]
    fn transactions_see_a_snapshot_until_commit() {
        let engine = MemoryEngine::new(["objects"]);
        let mut writer = engine.begin_txn().expect("begin");
        writer.put("objects", k(&[1]), vec![9]).expect("put");

        let reader = engine.begin_txn().expect("begin");
        let before = reader
            .collection("objects")
            .and_then(|c| c.get(&k(&[1])))
            .expect("get");
        assert_eq!(before, None);

        writer.commit().expect("commit");
        assert_eq!(engine.len("objects"), Some(1));
    }

    #[test]
    fn abort_discards_writes() {
        let engine = MemoryEngine::new(["objects"]);
        let mut txn = engine.begin_txn().expect("begin");
        txn.put("objects", k(&[1]), vec![9]).expect("put");

        txn.abort().expect("abort");

        assert_eq!(engine.len("objects"), Some(0));
    }

    #[test]
    fn concurrent_commits_conflict() {
        let engine = MemoryEngine::new(["objects"]);
        let mut first = engine.begin_txn().expect("begin");
        let mut second = engine.begin_txn().expect("begin");
        first.put("objects", k(&[1]), vec![1]).expect("put");
        second.put("objects", k(&[2]), vec![2]).expect("put");

        first.commit().expect("first commit");

        assert!(matches!(second.commit(), Err(StoreError::Conflict)));
    }

    #[test]
    fn unknown_collections_are_errors() {
        let engine = MemoryEngine::new(["objects"]);
        let txn = engine.begin_txn().expect("begin");

        assert!(matches!(
            txn.collection("nope"),
            Err(StoreError::UnknownCollection { .. })
        ));
    }
}
