//! Module: store
//! Responsibility: the narrow ordered byte-range store contract the executor scans.
//! Does not own: on-disk formats or any concrete engine beyond `MemoryEngine`.
//! Boundary: keys and values cross this seam as raw bytes.

mod error;
mod memory;

use crate::key::Key;

pub use error::StoreError;
pub use memory::{MemoryCollection, MemoryEngine};

///
/// StoreEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreEntry {
    pub key: Key,
    pub value: Vec<u8>,
}

///
/// StoreCursor
///
/// Bidirectional cursor over one collection. Every positioning call returns
/// the entry it lands on, or `None` once it runs off either end.
///

pub trait StoreCursor {
    /// Position at the first entry whose key is `>= key`.
    fn seek(&mut self, key: &Key) -> Result<Option<StoreEntry>, StoreError>;

    fn seek_first(&mut self) -> Result<Option<StoreEntry>, StoreError>;

    fn seek_last(&mut self) -> Result<Option<StoreEntry>, StoreError>;

    fn next(&mut self) -> Result<Option<StoreEntry>, StoreError>;

    fn prev(&mut self) -> Result<Option<StoreEntry>, StoreError>;

    /// Entry under the cursor, if positioned on one.
    fn current(&self) -> Option<&StoreEntry>;
}

///
/// OrderedCollection
///

pub trait OrderedCollection {
    fn cursor(&self) -> Result<Box<dyn StoreCursor + '_>, StoreError>;

    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, StoreError>;
}

///
/// StorageTxn
///
/// Consistent snapshot of every collection for the life of one transaction.
///

pub trait StorageTxn {
    fn collection(&self, name: &str) -> Result<&dyn OrderedCollection, StoreError>;

    fn put(&mut self, collection: &str, key: Key, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove `key`; returns whether it was present.
    fn delete(&mut self, collection: &str, key: &Key) -> Result<bool, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn abort(self: Box<Self>) -> Result<(), StoreError>;
}

///
/// StorageEngine
///

pub trait StorageEngine {
    fn begin_txn(&self) -> Result<Box<dyn StorageTxn + '_>, StoreError>;
}
