//! Module: codec
//! Responsibility: order-preserving binary encoding of `Value`.
//! Does not own: key composition or collation (see `key`, `text`).
//! Boundary: byte-wise comparison of two encodings equals `canonical_cmp`
//! of the values they encode (without a token table).

mod error;
mod reader;
mod token;
mod writer;

#[cfg(test)]
mod tests;

use crate::value::Value;

pub use error::CodecError;
pub use reader::ValueReader;
pub use token::{TokenSet, TokenTable};
pub use writer::ValueWriter;

///
/// Marker
///
/// Single-byte type marker written ahead of every encoded value.
/// Numeric order of the markers is the cross-type order of values.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Marker {
    /// Closes an object or an array.
    End = 0,
    Null = 1,
    ObjectBegin = 2,
    ArrayBegin = 3,
    String = 4,
    False = 5,
    True = 6,
    NegativeDecimal = 7,
    PositiveDecimal = 8,
    NegativeInt = 9,
    ZeroInt = 10,
    UInt8 = 11,
    UInt16 = 12,
    UInt32 = 13,
    Int64 = 14,
    /// Length-prefixed payload skipped by readers.
    Extension = 15,
}

/// Every marker, in strictly ascending byte order.
pub const MARKERS: [Marker; 16] = [
    Marker::End,
    Marker::Null,
    Marker::ObjectBegin,
    Marker::ArrayBegin,
    Marker::String,
    Marker::False,
    Marker::True,
    Marker::NegativeDecimal,
    Marker::PositiveDecimal,
    Marker::NegativeInt,
    Marker::ZeroInt,
    Marker::UInt8,
    Marker::UInt16,
    Marker::UInt32,
    Marker::Int64,
    Marker::Extension,
];

/// First byte value available to property-name tokens.
pub const TOKEN_START: u8 = 32;

impl Marker {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        if (byte as usize) < MARKERS.len() {
            Some(MARKERS[byte as usize])
        } else {
            None
        }
    }
}

/// Encode one value without a token table.
pub fn encode(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut writer = ValueWriter::new();
    writer.write_value(value)?;

    Ok(writer.into_bytes())
}

/// Decode exactly one value; trailing bytes are corruption.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    decode_with(bytes, None)
}

/// Decode exactly one value, resolving property-name tokens through `tokens`.
pub fn decode_with(bytes: &[u8], tokens: Option<&dyn TokenTable>) -> Result<Value, CodecError> {
    let mut reader = ValueReader::new(bytes);
    if let Some(tokens) = tokens {
        reader = reader.with_tokens(tokens);
    }
    let value = reader.read_value()?;
    if !reader.is_empty() {
        return Err(CodecError::CorruptStream {
            reason: "trailing bytes after value",
        });
    }

    Ok(value)
}
