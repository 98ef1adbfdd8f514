use crate::{
    codec::{CodecError, Marker, TOKEN_START, TokenTable},
    types::Decimal,
    value::Value,
};
use std::collections::BTreeMap;

///
/// ValueReader
///
/// Streaming decoder over a borrowed byte slice. Nesting is tracked with an
/// explicit frame stack, so arbitrarily deep documents never recurse.
///

pub struct ValueReader<'a> {
    input: &'a [u8],
    pos: usize,
    tokens: Option<&'a dyn TokenTable>,
}

// Partially decoded container on the frame stack.
enum Frame {
    Object {
        map: BTreeMap<String, Value>,
        name: Option<String>,
    },
    Array(Vec<Value>),
}

// Outcome of one decoding step.
enum Step {
    Value(Value),
    Close,
    Skipped,
}

// Property-name slot contents.
enum PropSlot<'a> {
    Name(&'a [u8]),
    Token(u8),
    End,
}

impl<'a> ValueReader<'a> {
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            tokens: None,
        }
    }

    #[must_use]
    pub const fn with_tokens(mut self, tokens: &'a dyn TokenTable) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Decode the next top-level value.
    pub fn read_value(&mut self) -> Result<Value, CodecError> {
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            // Phase 1: produce the next completed value, close, or skip.
            let step = match stack.last_mut() {
                Some(Frame::Object { name, .. }) if name.is_none() => match self.read_prop_slot()? {
                    PropSlot::End => Step::Close,
                    PropSlot::Name(bytes) => {
                        *name = Some(utf8(bytes)?);
                        continue;
                    }
                    PropSlot::Token(token) => {
                        *name = Some(self.resolve_token(token)?);
                        continue;
                    }
                },
                top => {
                    let in_array = matches!(top, Some(Frame::Array(_)));
                    let offset = self.pos;
                    let byte = self.read_u8()?;
                    match Marker::from_u8(byte) {
                        Some(Marker::End) if in_array => Step::Close,
                        Some(Marker::ObjectBegin) => {
                            stack.push(Frame::Object {
                                map: BTreeMap::new(),
                                name: None,
                            });
                            continue;
                        }
                        Some(Marker::ArrayBegin) => {
                            stack.push(Frame::Array(Vec::new()));
                            continue;
                        }
                        Some(Marker::Extension) => {
                            self.skip_extension()?;
                            Step::Skipped
                        }
                        Some(marker) => Step::Value(self.read_scalar(marker, offset)?),
                        None => return Err(CodecError::UnexpectedMarker { marker: byte, offset }),
                    }
                }
            };

            // Phase 2: attach the result to its parent frame.
            let done = match step {
                Step::Value(value) => value,
                Step::Close => match stack.pop() {
                    Some(Frame::Object { map, .. }) => Value::Object(map),
                    Some(Frame::Array(items)) => Value::Array(items),
                    None => {
                        return Err(CodecError::CorruptStream {
                            reason: "end marker outside a container",
                        });
                    }
                },
                Step::Skipped => {
                    if let Some(Frame::Object { name, .. }) = stack.last_mut() {
                        *name = None;
                    }
                    continue;
                }
            };

            match stack.last_mut() {
                None => return Ok(done),
                Some(Frame::Array(items)) => items.push(done),
                Some(Frame::Object { map, name }) => {
                    if let Some(name) = name.take() {
                        map.insert(name, done);
                    }
                }
            }
        }
    }

    /// Consume the next top-level value without materialising it.
    ///
    /// String payloads are not UTF-8 checked, so collation sort keys can be
    /// skipped as well as plain text.
    pub fn skip_value(&mut self) -> Result<(), CodecError> {
        // true = object frame
        let mut stack: Vec<bool> = Vec::new();
        let mut expect_name = false;

        loop {
            if expect_name && stack.last() == Some(&true) {
                match self.read_prop_slot()? {
                    PropSlot::End => {
                        stack.pop();
                    }
                    PropSlot::Name(_) | PropSlot::Token(_) => {
                        expect_name = false;
                        continue;
                    }
                }
            } else {
                let offset = self.pos;
                let byte = self.read_u8()?;
                match Marker::from_u8(byte) {
                    Some(Marker::End) if stack.last() == Some(&false) => {
                        stack.pop();
                    }
                    Some(Marker::ObjectBegin) => {
                        stack.push(true);
                        expect_name = true;
                        continue;
                    }
                    Some(Marker::ArrayBegin) => {
                        stack.push(false);
                        continue;
                    }
                    Some(Marker::Extension) => {
                        self.skip_extension()?;
                        // a top-level extension hides nothing; the value follows it
                        if stack.is_empty() {
                            continue;
                        }
                    }
                    Some(marker) => {
                        self.read_scalar_raw(marker, offset)?;
                    }
                    None => return Err(CodecError::UnexpectedMarker { marker: byte, offset }),
                }
            }

            if stack.is_empty() {
                return Ok(());
            }
            expect_name = true;
        }
    }

    fn read_scalar(&mut self, marker: Marker, offset: usize) -> Result<Value, CodecError> {
        let value = match marker {
            Marker::Null => Value::Null,
            Marker::False => Value::Bool(false),
            Marker::True => Value::Bool(true),
            Marker::String => Value::String(utf8(self.read_terminated()?)?),
            Marker::NegativeDecimal | Marker::PositiveDecimal => {
                let rep = self.read_i64()?;
                if (rep < 0) != (marker == Marker::NegativeDecimal) {
                    return Err(CodecError::CorruptStream {
                        reason: "decimal sign does not match marker",
                    });
                }
                Value::Decimal(Decimal::from_rep(rep))
            }
            Marker::NegativeInt => {
                let v = self.read_i64()?;
                if v >= 0 {
                    return Err(CodecError::CorruptStream {
                        reason: "negative int marker with non-negative payload",
                    });
                }
                Value::Int(v)
            }
            Marker::ZeroInt => Value::Int(0),
            Marker::UInt8 => Value::Int(i64::from(self.read_array::<1>()?[0])),
            Marker::UInt16 => Value::Int(i64::from(u16::from_be_bytes(self.read_array()?))),
            Marker::UInt32 => Value::Int(i64::from(u32::from_be_bytes(self.read_array()?))),
            Marker::Int64 => Value::Int(self.read_i64()?),
            Marker::End | Marker::ObjectBegin | Marker::ArrayBegin | Marker::Extension => {
                return Err(CodecError::UnexpectedMarker {
                    marker: marker.to_u8(),
                    offset,
                });
            }
        };

        Ok(value)
    }

    fn read_scalar_raw(&mut self, marker: Marker, offset: usize) -> Result<(), CodecError> {
        match marker {
            Marker::Null | Marker::False | Marker::True | Marker::ZeroInt => {}
            Marker::String => {
                self.read_terminated()?;
            }
            Marker::UInt8 => self.advance(1)?,
            Marker::UInt16 => self.advance(2)?,
            Marker::UInt32 => self.advance(4)?,
            Marker::NegativeDecimal
            | Marker::PositiveDecimal
            | Marker::NegativeInt
            | Marker::Int64 => self.advance(8)?,
            Marker::End | Marker::ObjectBegin | Marker::ArrayBegin | Marker::Extension => {
                return Err(CodecError::UnexpectedMarker {
                    marker: marker.to_u8(),
                    offset,
                });
            }
        }

        Ok(())
    }

    fn read_prop_slot(&mut self) -> Result<PropSlot<'a>, CodecError> {
        let offset = self.pos;
        let byte = self.read_u8()?;

        match byte {
            b if b == Marker::End.to_u8() => Ok(PropSlot::End),
            b if b == Marker::String.to_u8() => Ok(PropSlot::Name(self.read_terminated()?)),
            b if b >= TOKEN_START && self.tokens.is_some() => Ok(PropSlot::Token(b)),
            marker => Err(CodecError::UnexpectedMarker { marker, offset }),
        }
    }

    fn resolve_token(&self, token: u8) -> Result<String, CodecError> {
        self.tokens
            .and_then(|t| t.name_for(token))
            .map(str::to_string)
            .ok_or(CodecError::UnknownToken { token })
    }

    fn skip_extension(&mut self) -> Result<(), CodecError> {
        let len = u32::from_be_bytes(self.read_array()?);
        let len = usize::try_from(len).map_err(|_| CodecError::truncated())?;

        self.advance(len)
    }

    fn read_terminated(&mut self) -> Result<&'a [u8], CodecError> {
        let input: &'a [u8] = self.input;
        let rest = input.get(self.pos..).ok_or(CodecError::truncated())?;
        let end = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(CodecError::truncated())?;
        self.pos += end + 1;

        Ok(&rest[..end])
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = *self.input.get(self.pos).ok_or(CodecError::truncated())?;
        self.pos += 1;

        Ok(byte)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let end = self.pos.checked_add(N).ok_or(CodecError::truncated())?;
        let bytes = self.input.get(self.pos..end).ok_or(CodecError::truncated())?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos = end;

        Ok(out)
    }

    fn advance(&mut self, len: usize) -> Result<(), CodecError> {
        let end = self.pos.checked_add(len).ok_or(CodecError::truncated())?;
        if end > self.input.len() {
            return Err(CodecError::truncated());
        }
        self.pos = end;

        Ok(())
    }
}

fn utf8(bytes: &[u8]) -> Result<String, CodecError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::CorruptStream {
        reason: "string is not valid utf-8",
    })
}
