use crate::{
    codec::CodecError,
    config::ConfigError,
    key::KeyError,
    plan::PlanError,
    query::{CursorTokenError, QueryError},
    store::StoreError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every module error converts into this type at the crate boundary.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an index-origin corruption error.
    pub(crate) fn index_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Index, message)
    }

    /// Construct an executor-origin invariant violation.
    pub(crate) fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message,
        )
    }

    /// Construct the escalated form of a ghost-key warning.
    pub(crate) fn ghost_key(key: &[u8]) -> Self {
        Self {
            class: ErrorClass::InconsistentIndex,
            origin: ErrorOrigin::Executor,
            message: format!(
                "index entry references a missing record: {}",
                crate::query::encode_cursor(key)
            ),
            detail: Some(ErrorDetail::GhostKey { key: key.to_vec() }),
        }
    }

    #[must_use]
    pub const fn is_invalid_query(&self) -> bool {
        matches!(self.class, ErrorClass::InvalidQuery)
    }

    #[must_use]
    pub const fn is_ghost_key(&self) -> bool {
        matches!(self.detail, Some(ErrorDetail::GhostKey { .. }))
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Codec(CodecError),

    #[error("{0}")]
    Store(StoreError),

    #[error("ghost key ({} bytes)", key.len())]
    GhostKey { key: Vec<u8> },
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        Self {
            class: ErrorClass::Corruption,
            origin: ErrorOrigin::Codec,
            message: err.to_string(),
            detail: Some(ErrorDetail::Codec(err)),
        }
    }
}

impl From<KeyError> for InternalError {
    fn from(err: KeyError) -> Self {
        let class = match err {
            KeyError::Unsupported { .. } => ErrorClass::InvalidQuery,
            KeyError::IncrementOverflow | KeyError::Codec(_) => ErrorClass::InvariantViolation,
        };

        Self::new(class, ErrorOrigin::Key, err.to_string())
    }
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        Self::new(ErrorClass::InvalidQuery, ErrorOrigin::Query, err.to_string())
    }
}

impl From<CursorTokenError> for InternalError {
    fn from(err: CursorTokenError) -> Self {
        Self::new(ErrorClass::InvalidQuery, ErrorOrigin::Query, err.to_string())
    }
}

impl From<PlanError> for InternalError {
    fn from(err: PlanError) -> Self {
        let class = if err.is_invalid_query() {
            ErrorClass::InvalidQuery
        } else {
            ErrorClass::InvariantViolation
        };

        Self::new(class, ErrorOrigin::Plan, err.to_string())
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self {
            class: ErrorClass::Store,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    InvalidQuery,
    InconsistentIndex,
    Store,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::InvalidQuery => "invalid_query",
            Self::InconsistentIndex => "inconsistent_index",
            Self::Store => "store",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Key,
    Query,
    Plan,
    Index,
    Executor,
    Store,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Key => "key",
            Self::Query => "query",
            Self::Plan => "plan",
            Self::Index => "index",
            Self::Executor => "executor",
            Self::Store => "store",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_errors_classify_as_corruption() {
        let err: InternalError = CodecError::CorruptStream {
            reason: "truncated",
        }
        .into();

        assert_eq!(err.class, ErrorClass::Corruption);
        assert_eq!(err.origin, ErrorOrigin::Codec);
        assert!(matches!(err.detail, Some(ErrorDetail::Codec(_))));
    }

    #[test]
    fn ghost_key_escalation_carries_the_key() {
        let err = InternalError::ghost_key(&[0x0a, 0xff]);

        assert!(err.is_ghost_key());
        assert_eq!(err.class, ErrorClass::InconsistentIndex);
        assert!(err.message.ends_with("0aff"));
    }

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = InternalError::new(ErrorClass::Store, ErrorOrigin::Store, "io");

        assert_eq!(err.display_with_class(), "store:store: io");
    }
}
