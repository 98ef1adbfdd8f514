use thiserror::Error as ThisError;

///
/// CodecError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CodecError {
    #[error("corrupt value stream: {reason}")]
    CorruptStream { reason: &'static str },

    #[error("unexpected marker 0x{marker:02x} at offset {offset}")]
    UnexpectedMarker { marker: u8, offset: usize },

    #[error("unknown property token 0x{token:02x}")]
    UnknownToken { token: u8 },

    #[error("string contains an embedded NUL byte")]
    EmbeddedNul,
}

impl CodecError {
    pub(crate) const fn truncated() -> Self {
        Self::CorruptStream {
            reason: "unexpected end of stream",
        }
    }
}
