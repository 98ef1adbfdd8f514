//! Page tokens: the opaque text form of a continuation key.

use crate::key::Key;
use std::fmt;
use thiserror::Error as ThisError;

// Upper bound on accepted token text, untrusted input.
const MAX_PAGE_TOKEN_HEX_LEN: usize = 8 * 1024;

///
/// CursorTokenError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CursorTokenError {
    #[error("page token is empty")]
    Empty,

    #[error("page token exceeds max length: {len} hex chars (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("page token must have an even number of hex characters")]
    OddLength,

    #[error("invalid hex character at position {position}")]
    InvalidHex { position: usize },
}

///
/// PageToken
///
/// Continuation key handed back to callers between pages. The key is the
/// exact resume bound the next plan clamps its ranges to.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageToken(Key);

impl PageToken {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self(key)
    }

    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.0
    }

    #[must_use]
    pub fn into_key(self) -> Key {
        self.0
    }

    /// Parse the text form produced by `Display`.
    pub fn parse(token: &str) -> Result<Self, CursorTokenError> {
        decode_cursor(token).map(|bytes| Self(Key::from_bytes(bytes)))
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_cursor(self.0.as_bytes()))
    }
}

/// Encode raw key bytes as a lowercase hex token.
#[must_use]
pub fn encode_cursor(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(DIGITS[usize::from(byte >> 4)]));
        out.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
    }
    out
}

/// Decode a hex token into raw key bytes; surrounding whitespace is trimmed.
pub fn decode_cursor(token: &str) -> Result<Vec<u8>, CursorTokenError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(CursorTokenError::Empty);
    }
    if token.len() > MAX_PAGE_TOKEN_HEX_LEN {
        return Err(CursorTokenError::TooLong {
            len: token.len(),
            max: MAX_PAGE_TOKEN_HEX_LEN,
        });
    }
    if !token.len().is_multiple_of(2) {
        return Err(CursorTokenError::OddLength);
    }

    token
        .as_bytes()
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            let hi = hex_nibble(pair[0]).ok_or(CursorTokenError::InvalidHex {
                position: i * 2 + 1,
            })?;
            let lo = hex_nibble(pair[1]).ok_or(CursorTokenError::InvalidHex {
                position: i * 2 + 2,
            })?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

const fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_tokens_are_rejected() {
        assert_eq!(decode_cursor(""), Err(CursorTokenError::Empty));
        assert_eq!(decode_cursor(" \n\t"), Err(CursorTokenError::Empty));
    }

    #[test]
    fn odd_length_tokens_are_rejected() {
        assert_eq!(decode_cursor("abc"), Err(CursorTokenError::OddLength));
    }

    #[test]
    fn oversized_tokens_are_rejected() {
        let accepted = "aa".repeat(MAX_PAGE_TOKEN_HEX_LEN / 2);
        assert_eq!(
            decode_cursor(&accepted).expect("max-sized token").len(),
            MAX_PAGE_TOKEN_HEX_LEN / 2
        );

        let rejected = format!("{accepted}aa");
        assert_eq!(
            decode_cursor(&rejected),
            Err(CursorTokenError::TooLong {
                len: MAX_PAGE_TOKEN_HEX_LEN + 2,
                max: MAX_PAGE_TOKEN_HEX_LEN
            })
        );
    }

    #[test]
    fn invalid_hex_reports_position() {
        assert_eq!(
            decode_cursor("0x"),
            Err(CursorTokenError::InvalidHex { position: 2 })
        );
    }

    #[test]
    fn page_token_text_round_trips() {
        let token = PageToken::new(Key::from_bytes(vec![0x0a, 0xff, 0x00]));
        let text = token.to_string();

        assert_eq!(text, "0aff00");
        assert_eq!(PageToken::parse("  0AfF00 ").expect("parse token"), token);
    }
}
