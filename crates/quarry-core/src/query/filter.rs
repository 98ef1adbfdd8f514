use crate::{
    query::{CompOp, WhereClause},
    value::{Value, strict_order_cmp},
};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

/// Evaluate post-filter clauses against one decoded record.
///
/// A missing property never matches. An array-valued property matches when
/// any element satisfies the clause, mirroring index fan-out.
#[must_use]
pub fn matches_filter(clauses: &BTreeMap<String, WhereClause>, record: &Value) -> bool {
    clauses.iter().all(|(prop, clause)| {
        let Some(value) = record.get_path(prop) else {
            return false;
        };

        match value {
            Value::Array(items) => {
                items.iter().any(|item| test_clause(clause, item)) || test_clause(clause, value)
            }
            _ => test_clause(clause, value),
        }
    })
}

/// Keep only the selected dot-separated paths of `record`.
///
/// An empty selection keeps the whole record; unmatched paths are omitted.
#[must_use]
pub fn project(record: &Value, paths: &BTreeSet<String>) -> Value {
    if paths.is_empty() {
        return record.clone();
    }

    let mut out = BTreeMap::new();
    for path in paths {
        if let Some(value) = record.get_path(path) {
            let segments: Vec<&str> = path.split('.').collect();
            insert_path(&mut out, &segments, value.clone());
        }
    }

    Value::Object(out)
}

fn insert_path(out: &mut BTreeMap<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            out.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = out
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(BTreeMap::new()));
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

fn test_clause(clause: &WhereClause, value: &Value) -> bool {
    test_lower(clause, value) && test_upper(clause, value)
}

fn test_lower(clause: &WhereClause, value: &Value) -> bool {
    let Some(bound) = clause.lower() else {
        return true;
    };

    match (bound.op, &bound.value) {
        (CompOp::Eq, Value::Array(candidates)) => {
            candidates.iter().any(|c| c == value) || &bound.value == value
        }
        (CompOp::Eq, expected) => value == expected,
        (CompOp::NotEq, expected) => value != expected,
        (CompOp::Greater, expected) => in_order(value, expected, Ordering::is_gt),
        (CompOp::GreaterEq, expected) => in_order(value, expected, Ordering::is_ge),
        // rejected by validation for filters
        (CompOp::Less | CompOp::LessEq | CompOp::Prefix | CompOp::Search, _) => false,
    }
}

fn test_upper(clause: &WhereClause, value: &Value) -> bool {
    let Some(bound) = clause.upper() else {
        return true;
    };

    match bound.op {
        CompOp::Less => in_order(value, &bound.value, Ordering::is_lt),
        CompOp::LessEq => in_order(value, &bound.value, Ordering::is_le),
        _ => false,
    }
}

// Range bounds only order values of one scalar kind.
fn in_order(value: &Value, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    strict_order_cmp(value, bound).is_some_and(accept)
}
