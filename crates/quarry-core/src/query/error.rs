use crate::query::CompOp;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Contract violations detected while building or validating a query,
/// always before any store access.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("unknown query operator '{op}'")]
    UnknownOperator { op: String },

    #[error("array value used with non-equality operator {op} on '{prop}'")]
    ArrayValueForNonEq { prop: String, op: CompOp },

    #[error("operator {op} cannot be combined with the existing clause on '{prop}'")]
    InvalidOpCombo { prop: String, op: CompOp },

    #[error("conflicting collations on '{prop}'")]
    CollationMismatch { prop: String },

    #[error("query contains inequality operations on multiple properties")]
    MultipleInequalities,

    #[error("query contains array values on multiple properties")]
    MultipleArrayValues,

    #[error("operator {op} is not allowed in a filter clause on '{prop}'")]
    OperatorInFilter { prop: String, op: CompOp },

    #[error("query order '{order}' is not compatible with the clause on '{prop}'")]
    IncompatibleOrder { prop: String, order: String },
}
