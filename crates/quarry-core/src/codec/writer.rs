use crate::{
    codec::{CodecError, Marker, TokenTable},
    types::Decimal,
    value::Value,
};

///
/// ValueWriter
///
/// Append-only encoder. Composite values are written depth-first between
/// explicit begin and end markers, so the writer never rewinds.
///

pub struct ValueWriter<'t> {
    buf: Vec<u8>,
    tokens: Option<&'t dyn TokenTable>,
}

impl Default for ValueWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> ValueWriter<'t> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            tokens: None,
        }
    }

    /// Substitute registered property names with their token byte.
    #[must_use]
    pub const fn with_tokens(mut self, tokens: &'t dyn TokenTable) -> Self {
        self.tokens = Some(tokens);
        self
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_value(&mut self, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(b) => self.write_bool(*b),
            Value::Int(i) => self.write_int(*i),
            Value::Decimal(d) => self.write_decimal(*d),
            Value::String(s) => self.write_string(s)?,
            Value::Array(items) => {
                self.begin_array();
                for item in items {
                    self.write_value(item)?;
                }
                self.end();
            }
            Value::Object(map) => {
                self.begin_object();
                for (name, item) in map {
                    self.write_prop_name(name)?;
                    self.write_value(item)?;
                }
                self.end();
            }
        }

        Ok(())
    }

    pub fn write_null(&mut self) {
        self.push_marker(Marker::Null);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.push_marker(if value { Marker::True } else { Marker::False });
    }

    /// Integers use the narrowest tier that holds the magnitude; negatives
    /// always take the full width so two's complement order holds.
    pub fn write_int(&mut self, value: i64) {
        match value {
            i64::MIN..=-1 => {
                self.push_marker(Marker::NegativeInt);
                self.buf.extend_from_slice(&value.to_be_bytes());
            }
            0 => self.push_marker(Marker::ZeroInt),
            _ => {
                if let Ok(v) = u8::try_from(value) {
                    self.push_marker(Marker::UInt8);
                    self.buf.push(v);
                } else if let Ok(v) = u16::try_from(value) {
                    self.push_marker(Marker::UInt16);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                } else if let Ok(v) = u32::try_from(value) {
                    self.push_marker(Marker::UInt32);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                } else {
                    self.push_marker(Marker::Int64);
                    self.buf.extend_from_slice(&value.to_be_bytes());
                }
            }
        }
    }

    pub fn write_decimal(&mut self, value: Decimal) {
        let marker = if value.is_negative() {
            Marker::NegativeDecimal
        } else {
            Marker::PositiveDecimal
        };
        self.push_marker(marker);
        self.buf.extend_from_slice(&value.rep().to_be_bytes());
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.push_marker(Marker::String);
        self.push_terminated(value.as_bytes())
    }

    /// Write pre-computed string bytes (a collation sort key) under the
    /// string marker.
    pub fn write_string_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.push_marker(Marker::String);
        self.push_terminated(bytes)
    }

    pub fn write_prop_name(&mut self, name: &str) -> Result<(), CodecError> {
        if let Some(token) = self.tokens.and_then(|t| t.token_for(name)) {
            self.buf.push(token);
            return Ok(());
        }

        self.write_string(name)
    }

    pub fn begin_object(&mut self) {
        self.push_marker(Marker::ObjectBegin);
    }

    pub fn begin_array(&mut self) {
        self.push_marker(Marker::ArrayBegin);
    }

    pub fn end(&mut self) {
        self.push_marker(Marker::End);
    }

    fn push_marker(&mut self, marker: Marker) {
        self.buf.push(marker.to_u8());
    }

    fn push_terminated(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        if bytes.contains(&0) {
            return Err(CodecError::EmbeddedNul);
        }
        self.buf.extend_from_slice(bytes);
        self.buf.push(0);

        Ok(())
    }
}
