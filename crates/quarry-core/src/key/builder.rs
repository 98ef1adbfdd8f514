use crate::key::Key;
use std::collections::BTreeSet;

/// Ordered, deduplicated set of keys.
pub type KeySet = BTreeSet<Key>;

///
/// KeyBuilder
///
/// Running Cartesian product of key columns. Each pushed column multiplies
/// the current set by its candidates; the builder does not cap the product.
///

#[derive(Clone, Debug, Default)]
pub struct KeyBuilder {
    keys: KeySet,
    started: bool,
}

impl KeyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one column of candidate sub-keys.
    pub fn push(&mut self, column: &KeySet) {
        if !self.started {
            self.keys.clone_from(column);
            self.started = true;
            return;
        }

        let mut product = KeySet::new();
        for prefix in &self.keys {
            for suffix in column {
                let mut key = prefix.clone();
                key.append(suffix);
                product.insert(key);
            }
        }
        self.keys = product;
    }

    /// Append a single-candidate column.
    pub fn push_key(&mut self, key: Key) {
        self.push(&KeySet::from([key]));
    }

    #[must_use]
    pub const fn keys(&self) -> &KeySet {
        &self.keys
    }

    #[must_use]
    pub fn into_keys(self) -> KeySet {
        self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
