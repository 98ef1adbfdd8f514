use crate::value::Value;
use std::{cmp::Ordering, collections::BTreeMap};

/// Total canonical comparator.
///
/// Ordering rules:
/// 1. Canonical variant tag
/// 2. Variant-specific comparison for same-tagged values
///
/// This is the order the codec's byte encoding reproduces.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let tag = left.tag().cmp(&right.tag());
    if tag != Ordering::Equal {
        return tag;
    }

    canonical_cmp_same_tag(left, right)
}

/// Strict comparator for identical scalar variants.
///
/// Returns `None` for mismatched variants and for containers; range filters
/// only apply between values of one scalar kind.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn canonical_cmp_same_tag(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Value::Array(a), Value::Array(b)) => canonical_cmp_array(a, b),
        (Value::Object(a), Value::Object(b)) => canonical_cmp_object(a, b),
        _ => Ordering::Equal,
    }
}

// Elementwise, then shorter first.
fn canonical_cmp_array(left: &[Value], right: &[Value]) -> Ordering {
    for (a, b) in left.iter().zip(right) {
        let cmp = canonical_cmp(a, b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

// Entries in key order as (name, value) pairs, then shorter first.
fn canonical_cmp_object(
    left: &BTreeMap<String, Value>,
    right: &BTreeMap<String, Value>,
) -> Ordering {
    for ((ka, va), (kb, vb)) in left.iter().zip(right) {
        let cmp = ka
            .as_bytes()
            .cmp(kb.as_bytes())
            .then_with(|| canonical_cmp(va, vb));
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}
