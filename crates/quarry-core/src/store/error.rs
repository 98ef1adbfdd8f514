use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failures reported by a storage backend. The executor never retries them.
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("unknown collection '{name}'")]
    UnknownCollection { name: String },

    #[error("transaction conflict: the store changed after this transaction began")]
    Conflict,

    #[error("storage backend failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
