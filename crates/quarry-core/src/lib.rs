//! Query planning and execution core for an embedded document store:
//! an order-preserving value codec, a key-range planner over composite
//! indexes, and a cursor executor over abstract ordered stores.

pub mod codec;
pub mod config;
pub mod error;
pub mod exec;
pub mod index;
pub mod key;
pub mod obs;
pub mod plan;
pub mod query;
pub mod record;
pub mod store;
pub mod text;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Primary id property, present on every record and appended to every index.
pub const ID_PROP: &str = "_id";

/// Deletion flag property.
pub const DEL_PROP: &str = "_del";

/// Kind tag property read by the record decoder.
pub const KIND_PROP: &str = "_kind";

/// Revision property read by the record decoder.
pub const REV_PROP: &str = "_rev";

/// Limit of a query that never set one.
pub const DEFAULT_LIMIT: u32 = u32::MAX;

/// Default cap on ids collected by one search.
pub const MAX_SEARCH_RESULTS: u32 = 10_000;

///
/// Prelude
///
/// Query vocabulary only; stores, cursors and errors stay in their modules.
///

pub mod prelude {
    pub use crate::{
        index::{IndexDescriptor, IndexId, IndexProp},
        query::{CompOp, PageToken, Query},
        text::CollationStrength,
        types::Decimal,
        value::Value,
    };
}
