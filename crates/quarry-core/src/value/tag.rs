use crate::value::Value;

///
/// ValueTag
///
/// Canonical value-variant tag. Declaration order is the cross-variant
/// ordering of values and matches the codec's marker order.
///
/// IMPORTANT:
/// Tag values are part of stable key ordering and must remain fixed.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum ValueTag {
    Null = 1,
    Object = 2,
    Array = 3,
    String = 4,
    Bool = 5,
    Decimal = 6,
    Int = 7,
}

impl ValueTag {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Object => "Object",
            Self::Array => "Array",
            Self::String => "String",
            Self::Bool => "Bool",
            Self::Decimal => "Decimal",
            Self::Int => "Int",
        }
    }
}

#[must_use]
pub const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Null => ValueTag::Null,
        Value::Object(_) => ValueTag::Object,
        Value::Array(_) => ValueTag::Array,
        Value::String(_) => ValueTag::String,
        Value::Bool(_) => ValueTag::Bool,
        Value::Decimal(_) => ValueTag::Decimal,
        Value::Int(_) => ValueTag::Int,
    }
}
