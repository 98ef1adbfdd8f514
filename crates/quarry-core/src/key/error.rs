use crate::codec::CodecError;
use thiserror::Error as ThisError;

///
/// KeyError
///

#[derive(Debug, ThisError)]
pub enum KeyError {
    #[error("key has no successor: every byte is 0xff")]
    IncrementOverflow,

    #[error("value kind '{kind}' cannot be used as a key component")]
    Unsupported { kind: &'static str },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
