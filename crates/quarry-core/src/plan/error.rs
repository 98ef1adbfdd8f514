use crate::{key::KeyError, query::QueryError};
use thiserror::Error as ThisError;

///
/// PlanError
///
/// Plan-time failures. All of them are raised before any store access.
///

#[derive(Debug, ThisError)]
pub enum PlanError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("no index of kind '{kind}' can answer the query")]
    NoCompatibleIndex { kind: String },

    #[error("search value for '{prop}' must be text")]
    SearchNotText { prop: String },

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl PlanError {
    /// True when the caller's query, not the engine, is at fault.
    #[must_use]
    pub const fn is_invalid_query(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery(_)
                | Self::NoCompatibleIndex { .. }
                | Self::SearchNotText { .. }
                | Self::Key(KeyError::Unsupported { .. })
        )
    }
}
