//! Module: index
//! Responsibility: index descriptors, query answerability and index selection.
//! Does not own: range planning (see `plan`) or index writes to a store.
//! Boundary: `can_answer` is the only gate between a query and a plan.

mod extract;


use crate::{
    DEL_PROP, ID_PROP,
    codec::ValueWriter,
    key::Key,
    query::{CompOp, Query},
    text::CollationStrength,
    value::Value,
};
use derive_more::Display;

pub use extract::IndexDelta;

///
/// IndexId
///
/// Numeric id written as the first component of every key of an index.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IndexId(pub u32);

impl IndexId {
    /// Encoded key prefix shared by every entry of this index.
    #[must_use]
    pub fn prefix_key(self) -> Key {
        let mut writer = ValueWriter::new();
        writer.write_int(i64::from(self.0));

        Key::from_bytes(writer.into_bytes())
    }
}

///
/// IndexProp
///
/// One indexed property path. `*` matches every property at its level and
/// array values fan out into one key per element.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexProp {
    pub name: String,
    pub collation: Option<CollationStrength>,
    pub default: Option<Value>,
    pub tokenize: bool,
}

impl IndexProp {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collation: None,
            default: None,
            tokenize: false,
        }
    }

    #[must_use]
    pub const fn collated(mut self, strength: CollationStrength) -> Self {
        self.collation = Some(strength);
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Index each word of string values separately, for `?` search.
    #[must_use]
    pub const fn tokenized(mut self) -> Self {
        self.tokenize = true;
        self
    }
}

///
/// IndexDescriptor
///
/// Ordered property list of one index. Construction appends the built-in
/// `_id` prop and, for delete-inclusive indexes, a leading `_del`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexDescriptor {
    name: String,
    id: IndexId,
    props: Vec<IndexProp>,
    include_deleted: bool,
}

impl IndexDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        id: IndexId,
        props: Vec<IndexProp>,
        include_deleted: bool,
    ) -> Self {
        let mut props = props;
        if !props.iter().any(|p| p.name == ID_PROP) {
            props.push(IndexProp::new(ID_PROP));
        }
        if include_deleted && props.first().is_none_or(|p| p.name != DEL_PROP) {
            props.insert(0, IndexProp::new(DEL_PROP).with_default(Value::Bool(false)));
        }

        Self {
            name: name.into(),
            id,
            props,
            include_deleted,
        }
    }

    /// The primary-id index of a kind.
    #[must_use]
    pub fn id_index(id: IndexId) -> Self {
        Self::new(ID_PROP, id, Vec::new(), false)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn id(&self) -> IndexId {
        self.id
    }

    #[must_use]
    pub fn props(&self) -> &[IndexProp] {
        &self.props
    }

    #[must_use]
    pub const fn include_deleted(&self) -> bool {
        self.include_deleted
    }

    /// Tuple ordinal of `_id` within a key, counting the index-id prefix.
    #[must_use]
    pub fn id_position(&self) -> usize {
        self.props
            .iter()
            .position(|p| p.name == ID_PROP)
            .map_or(self.props.len(), |i| i + 1)
    }

    /// True for `[_id]` and `[_del, _id]`.
    #[must_use]
    pub fn is_id_index(&self) -> bool {
        match self.props.as_slice() {
            [only] => only.name == ID_PROP,
            [first, second] => first.name == DEL_PROP && second.name == ID_PROP,
            _ => false,
        }
    }

    /// Whether the results of `query` are one contiguous, correctly ordered
    /// run of this index.
    #[must_use]
    pub fn can_answer(&self, query: &Query) -> bool {
        let clauses = query.where_clauses();
        let mut remaining = clauses.len();
        if remaining > self.props.len() {
            return false;
        }

        // Phase 1: skip the implicit deletion flag.
        let mut props = self.props.iter().peekable();
        if self.include_deleted && !clauses.contains_key(DEL_PROP) {
            props.next();
        }

        // Phase 2: unconstrained queries only need a matching order.
        let order = query.order_prop();
        if remaining == 0 {
            return match (order, props.peek()) {
                (None, _) => self.is_id_index(),
                (Some(order), Some(first)) => first.name == order,
                (Some(_), None) => false,
            };
        }

        // Phase 3: referenced props form an unbroken prefix; only the last may
        // be a non-equality, and the order prop must follow the run.
        while let Some(prop) = props.next() {
            remaining -= 1;
            let Some(clause) = clauses.get(&prop.name) else {
                return false;
            };
            if remaining > 0 && clause.lower_op() != Some(CompOp::Eq) {
                return false;
            }
            if clause.collation() != prop.collation {
                return false;
            }
            if remaining == 0 {
                return match order {
                    Some(order) if !clauses.contains_key(order) => {
                        props.peek().is_some_and(|next| next.name == order)
                    }
                    _ => true,
                };
            }
        }

        false
    }
}

/// First index, in declaration order, that can answer `query`.
#[must_use]
pub fn select_index<'a>(
    indexes: &'a [IndexDescriptor],
    query: &Query,
) -> Option<&'a IndexDescriptor> {
    indexes.iter().find(|index| index.can_answer(query))
}
