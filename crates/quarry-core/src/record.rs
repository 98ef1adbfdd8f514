//! Module: record
//! Responsibility: decode primary-collection bytes into a record header plus value.
//! Does not own: kind schemas or revision assignment.
//! Boundary: the executor only ever sees records through `RecordDecoder`.

use crate::{
    DEL_PROP, KIND_PROP, REV_PROP,
    codec::{self, CodecError, TokenSet, TokenTable, ValueWriter},
    value::Value,
};

///
/// DecodedRecord
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedRecord {
    pub kind: String,
    pub revision: i64,
    pub deleted: bool,
    pub value: Value,
}

///
/// RecordDecoder
///

pub trait RecordDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRecord, CodecError>;
}

///
/// ObjectRecordDecoder
///
/// Records stored as one codec-encoded object carrying `_kind`, `_rev` and
/// `_del` alongside the user properties. Missing header props default to an
/// empty kind, revision zero and not deleted.
///

#[derive(Clone, Debug, Default)]
pub struct ObjectRecordDecoder {
    tokens: Option<TokenSet>,
}

impl ObjectRecordDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: None }
    }

    #[must_use]
    pub fn with_tokens(tokens: TokenSet) -> Self {
        Self {
            tokens: Some(tokens),
        }
    }

    /// Encode `record` the way `decode` expects it.
    pub fn encode(&self, record: &Value) -> Result<Vec<u8>, CodecError> {
        let mut writer = ValueWriter::new();
        if let Some(tokens) = self.token_table() {
            writer = writer.with_tokens(tokens);
        }
        writer.write_value(record)?;

        Ok(writer.into_bytes())
    }

    fn token_table(&self) -> Option<&dyn TokenTable> {
        self.tokens.as_ref().map(|t| t as &dyn TokenTable)
    }
}

impl RecordDecoder for ObjectRecordDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRecord, CodecError> {
        let value = codec::decode_with(bytes, self.token_table())?;
        if value.as_object().is_none() {
            return Err(CodecError::CorruptStream {
                reason: "record is not an object",
            });
        }

        Ok(DecodedRecord {
            kind: value
                .get(KIND_PROP)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            revision: value.get(REV_PROP).and_then(Value::as_int).unwrap_or(0),
            deleted: value.get(DEL_PROP).and_then(Value::as_bool).unwrap_or(false),
            value,
        })
    }
}

///
/// TESTS
///
