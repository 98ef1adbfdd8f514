//! Shared fixtures for executor tests.

use crate::{
    ID_PROP,
    config::QueryConfig,
    exec::{ExecServices, QueryItem},
    index::IndexDescriptor,
    key::Key,
    record::ObjectRecordDecoder,
    store::{MemoryEngine, StorageEngine},
    text::BasicTextProvider,
    value::Value,
};

///
/// Fixture
///
/// Memory engine laid out the way `QueryConfig::default` expects, with the
/// index keys of every inserted record kept in step.
///

pub(crate) struct Fixture {
    pub engine: MemoryEngine,
    pub indexes: Vec<IndexDescriptor>,
    pub config: QueryConfig,
    text: BasicTextProvider,
    decoder: ObjectRecordDecoder,
}

impl Fixture {
    pub fn new(indexes: Vec<IndexDescriptor>) -> Self {
        let config = QueryConfig::default();
        let engine = MemoryEngine::new([
            config.layout.primary.clone(),
            config.layout.index.clone(),
        ]);

        Self {
            engine,
            indexes,
            text: BasicTextProvider::new(config.locale.clone()),
            decoder: ObjectRecordDecoder::new(),
            config,
        }
    }

    pub fn services(&self) -> ExecServices<'_> {
        ExecServices::new(&self.text, &self.decoder)
    }

    /// Store `record` under its `_id` and write its keys into every index.
    pub fn insert(&self, record: Value) {
        let id = record.get(ID_PROP).cloned().expect("record id");
        let mut txn = self.engine.begin_txn().expect("begin");
        txn.put(
            &self.config.layout.primary,
            primary_key(&id),
            self.decoder.encode(&record).expect("encode record"),
        )
        .expect("put record");

        for index in &self.indexes {
            for key in index.keys_for(&record, &self.text).expect("index keys") {
                txn.put(&self.config.layout.index, key, Vec::new())
                    .expect("put index key");
            }
        }
        txn.commit().expect("commit");
    }

    pub fn insert_all(&self, records: impl IntoIterator<Item = Value>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Drop the primary record of `id` but leave its index keys behind.
    pub fn orphan(&self, id: impl Into<Value>) {
        let mut txn = self.engine.begin_txn().expect("begin");
        let removed = txn
            .delete(&self.config.layout.primary, &primary_key(&id.into()))
            .expect("delete");
        assert!(removed, "record to orphan must exist");
        txn.commit().expect("commit");
    }
}

pub(crate) fn primary_key(id: &Value) -> Key {
    Key::from_value(id, None).expect("id key")
}

/// `_id` values of `items`, in order.
pub(crate) fn ids(items: &[QueryItem]) -> Vec<Value> {
    items.iter().map(|item| item.id.clone()).collect()
}
