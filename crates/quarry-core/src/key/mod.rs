//! Module: key
//! Responsibility: comparable composite keys, key ranges and key-set products.
//! Does not own: which values go into a key (see `index`, `plan`).
//! Boundary: a `Key` is a concatenation of self-delimiting codec encodings.

mod builder;
mod error;
mod range;

#[cfg(test)]
mod tests;

use crate::{
    codec::{ValueWriter, encode},
    text::Collator,
    value::Value,
};
use std::fmt;

pub use builder::{KeyBuilder, KeySet};
pub use error::KeyError;
pub use range::KeyRange;

///
/// Key
///
/// Opaque ordered byte string. Byte-wise ordering of composite keys equals
/// the lexicographic order of their component values.
///

#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Key(Vec<u8>);

impl Key {
    /// The empty key; as a range bound it means unbounded.
    pub const EMPTY: Self = Self(Vec::new());

    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encode one scalar component.
    ///
    /// Strings go through `collator` when one is supplied, so the key bytes
    /// carry the collation sort key under the string marker.
    pub fn from_value(value: &Value, collator: Option<&dyn Collator>) -> Result<Self, KeyError> {
        let mut key = Self::default();
        key.push_value(value, collator)?;

        Ok(key)
    }

    /// Append one scalar component.
    pub fn push_value(
        &mut self,
        value: &Value,
        collator: Option<&dyn Collator>,
    ) -> Result<(), KeyError> {
        match (value, collator) {
            (Value::Array(_) | Value::Object(_), _) => Err(KeyError::Unsupported {
                kind: value.tag().label(),
            }),
            (Value::String(text), Some(collator)) => {
                let mut writer = ValueWriter::new();
                writer.write_string_bytes(&collator.sort_key(text))?;
                self.0.extend_from_slice(writer.as_bytes());
                Ok(())
            }
            _ => {
                self.0.extend(encode(value)?);
                Ok(())
            }
        }
    }

    pub fn append(&mut self, other: &Self) {
        self.0.extend_from_slice(&other.0);
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Least key greater than every key having `self` as a prefix.
    ///
    /// Trailing 0xFF bytes are dropped and the last remaining byte is
    /// incremented. A key made only of 0xFF bytes has no such successor.
    pub fn increment(&self) -> Result<Self, KeyError> {
        let mut bytes = self.0.clone();
        while let Some(last) = bytes.last_mut() {
            if *last == u8::MAX {
                bytes.pop();
            } else {
                *last += 1;
                return Ok(Self(bytes));
            }
        }

        Err(KeyError::IncrementOverflow)
    }

    #[must_use]
    pub fn has_prefix(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True when `self`, minus its string terminator, is a byte prefix of `other`.
    ///
    /// Used for token keys, where "abc" should cover "abcd".
    #[must_use]
    pub fn string_prefix_of(&self, other: &Self) -> bool {
        match self.0.split_last() {
            Some((&0, body)) => other.0.starts_with(body),
            _ => other.has_prefix(self),
        }
    }

    /// Drop a trailing string terminator, turning a string key into a prefix pattern.
    pub fn strip_terminator(&mut self) -> bool {
        if self.0.last() == Some(&0) {
            self.0.pop();
            return true;
        }

        false
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
