//! Module: query
//! Responsibility: the logical query model and its plan-independent validation.
//! Does not own: index choice or key ranges (see `index`, `plan`).
//! Boundary: a query that passes `validate` is safe to hand to the planner.

mod error;
mod filter;
mod page;


use crate::{DEFAULT_LIMIT, DEL_PROP, key::Key, text::CollationStrength, value::Value};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

pub use error::QueryError;
pub use filter::{matches_filter, project};
pub use page::{CursorTokenError, PageToken, decode_cursor, encode_cursor};

///
/// CompOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompOp {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    /// String prefix match (`%`).
    Prefix,
    /// Full-text token search (`?`).
    Search,
}

impl CompOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Prefix => "%",
            Self::Search => "?",
        }
    }

    /// `<` and `<=` bound a clause from above; every other operator is a lower bound.
    #[must_use]
    pub const fn is_upper(self) -> bool {
        matches!(self, Self::Less | Self::LessEq)
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CompOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "=" => Self::Eq,
            "!=" => Self::NotEq,
            "<" => Self::Less,
            "<=" => Self::LessEq,
            ">" => Self::Greater,
            ">=" => Self::GreaterEq,
            "%" => Self::Prefix,
            "?" => Self::Search,
            other => {
                return Err(QueryError::UnknownOperator {
                    op: other.to_string(),
                });
            }
        };

        Ok(op)
    }
}

///
/// ClauseBound
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClauseBound {
    pub op: CompOp,
    pub value: Value,
}

///
/// WhereClause
///
/// Predicate on one property: an optional lower bound (any operator other
/// than `<`/`<=`) and an optional upper bound (`<`/`<=`).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WhereClause {
    lower: Option<ClauseBound>,
    upper: Option<ClauseBound>,
    collation: Option<CollationStrength>,
}

impl WhereClause {
    #[must_use]
    pub const fn lower(&self) -> Option<&ClauseBound> {
        self.lower.as_ref()
    }

    #[must_use]
    pub const fn upper(&self) -> Option<&ClauseBound> {
        self.upper.as_ref()
    }

    #[must_use]
    pub const fn collation(&self) -> Option<CollationStrength> {
        self.collation
    }

    #[must_use]
    pub fn lower_op(&self) -> Option<CompOp> {
        self.lower.as_ref().map(|b| b.op)
    }

    #[must_use]
    pub fn upper_op(&self) -> Option<CompOp> {
        self.upper.as_ref().map(|b| b.op)
    }

    /// Equality on a single value; anything else widens the scan.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        self.lower_op() == Some(CompOp::Eq) && self.upper.is_none()
    }

    /// True when the scan over this clause yields keys in this prop's order.
    #[must_use]
    pub fn defines_order(&self) -> bool {
        match &self.lower {
            Some(bound) => bound.op != CompOp::Eq || matches!(bound.value, Value::Array(_)),
            None => true,
        }
    }

    fn add(
        &mut self,
        prop: &str,
        op: CompOp,
        value: Value,
        collation: Option<CollationStrength>,
    ) -> Result<(), QueryError> {
        let combo_err = || QueryError::InvalidOpCombo {
            prop: prop.to_string(),
            op,
        };

        // Phase 1: the only legal pairing is (> | >=) with (< | <=).
        let fresh = self.lower.is_none() && self.upper.is_none();
        if !fresh {
            let compatible = match op {
                CompOp::Less | CompOp::LessEq => matches!(
                    self.lower_op(),
                    None | Some(CompOp::Greater | CompOp::GreaterEq)
                ),
                CompOp::Greater | CompOp::GreaterEq => matches!(
                    self.upper_op(),
                    None | Some(CompOp::Less | CompOp::LessEq)
                ),
                _ => false,
            };
            if !compatible {
                return Err(combo_err());
            }
        }

        // Phase 2: collation must agree with any previously set strength.
        if self.collation.is_some() && collation != self.collation {
            return Err(QueryError::CollationMismatch {
                prop: prop.to_string(),
            });
        }
        self.collation = collation;

        // Phase 3: store the bound.
        let slot = if op.is_upper() {
            &mut self.upper
        } else {
            &mut self.lower
        };
        if slot.is_some() {
            return Err(combo_err());
        }
        *slot = Some(ClauseBound { op, value });

        Ok(())
    }
}

///
/// Query
///
/// Declarative find over one kind. Clauses are keyed by property path.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Query {
    from: String,
    where_clauses: BTreeMap<String, WhereClause>,
    filter_clauses: BTreeMap<String, WhereClause>,
    select: BTreeSet<String>,
    exclude_kinds: BTreeSet<String>,
    order: Option<String>,
    distinct: Option<String>,
    desc: bool,
    limit: u32,
    page: Option<Key>,
}

impl Query {
    #[must_use]
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            where_clauses: BTreeMap::new(),
            filter_clauses: BTreeMap::new(),
            select: BTreeSet::new(),
            exclude_kinds: BTreeSet::new(),
            order: None,
            distinct: None,
            desc: false,
            limit: DEFAULT_LIMIT,
            page: None,
        }
    }

    ///
    /// BUILDERS
    ///

    /// Add an index-answerable predicate.
    pub fn where_clause(
        self,
        prop: &str,
        op: CompOp,
        value: impl Into<Value>,
    ) -> Result<Self, QueryError> {
        self.where_collated(prop, op, value, None)
    }

    /// Add an index-answerable predicate compared under `collation`.
    pub fn where_collated(
        mut self,
        prop: &str,
        op: CompOp,
        value: impl Into<Value>,
        collation: Option<CollationStrength>,
    ) -> Result<Self, QueryError> {
        add_clause(&mut self.where_clauses, prop, op, value.into(), collation)?;
        Ok(self)
    }

    /// Add a post-filter evaluated against decoded records.
    pub fn filter(
        mut self,
        prop: &str,
        op: CompOp,
        value: impl Into<Value>,
    ) -> Result<Self, QueryError> {
        add_clause(&mut self.filter_clauses, prop, op, value.into(), None)?;
        Ok(self)
    }

    #[must_use]
    pub fn order_by(mut self, prop: impl Into<String>) -> Self {
        self.order = Some(prop.into());
        self
    }

    #[must_use]
    pub const fn desc(mut self, desc: bool) -> Self {
        self.desc = desc;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn page(mut self, page: Option<PageToken>) -> Self {
        self.page = page.map(PageToken::into_key);
        self
    }

    #[must_use]
    pub fn distinct(mut self, prop: impl Into<String>) -> Self {
        self.distinct = Some(prop.into());
        self
    }

    #[must_use]
    pub fn select(mut self, prop: impl Into<String>) -> Self {
        self.select.insert(prop.into());
        self
    }

    #[must_use]
    pub fn exclude_kind(mut self, kind: impl Into<String>) -> Self {
        self.exclude_kinds.insert(kind.into());
        self
    }

    /// Include deleted records by matching both deletion-flag values.
    #[must_use]
    pub fn include_deleted(mut self, include: bool) -> Self {
        if include {
            let clause = WhereClause {
                lower: Some(ClauseBound {
                    op: CompOp::Eq,
                    value: Value::Array(vec![Value::Bool(false), Value::Bool(true)]),
                }),
                upper: None,
                collation: None,
            };
            self.where_clauses.insert(DEL_PROP.to_string(), clause);
        } else {
            self.where_clauses.remove(DEL_PROP);
        }
        self
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub fn from_kind(&self) -> &str {
        &self.from
    }

    #[must_use]
    pub const fn where_clauses(&self) -> &BTreeMap<String, WhereClause> {
        &self.where_clauses
    }

    #[must_use]
    pub const fn filter_clauses(&self) -> &BTreeMap<String, WhereClause> {
        &self.filter_clauses
    }

    #[must_use]
    pub fn clause(&self, prop: &str) -> Option<&WhereClause> {
        self.where_clauses.get(prop)
    }

    #[must_use]
    pub fn order_prop(&self) -> Option<&str> {
        self.order.as_deref()
    }

    #[must_use]
    pub fn distinct_prop(&self) -> Option<&str> {
        self.distinct.as_deref()
    }

    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<String> {
        &self.select
    }

    #[must_use]
    pub const fn excluded_kinds(&self) -> &BTreeSet<String> {
        &self.exclude_kinds
    }

    #[must_use]
    pub const fn is_desc(&self) -> bool {
        self.desc
    }

    #[must_use]
    pub const fn limit_value(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub const fn page_key(&self) -> Option<&Key> {
        self.page.as_ref()
    }

    /// True when a `?` clause routes execution through the search cursor.
    #[must_use]
    pub fn has_search(&self) -> bool {
        self.where_clauses
            .values()
            .any(|c| c.lower_op() == Some(CompOp::Search))
    }

    ///
    /// VALIDATION
    ///

    /// Plan-independent contract checks.
    pub fn validate(&self) -> Result<(), QueryError> {
        let mut has_inequality = false;
        let mut has_array = false;

        for (prop, clause) in &self.where_clauses {
            if clause.lower_op() != Some(CompOp::Eq) {
                if has_inequality {
                    return Err(QueryError::MultipleInequalities);
                }
                has_inequality = true;
            }
            let array = clause
                .lower()
                .is_some_and(|b| matches!(b.value, Value::Array(_)));
            if array && prop != DEL_PROP {
                if has_array {
                    return Err(QueryError::MultipleArrayValues);
                }
                has_array = true;
            }
        }

        for (prop, clause) in &self.filter_clauses {
            if let Some(op @ (CompOp::Prefix | CompOp::Search)) = clause.lower_op() {
                return Err(QueryError::OperatorInFilter {
                    prop: prop.clone(),
                    op,
                });
            }
        }

        Ok(())
    }

    /// Checks for queries served by an ordered index scan.
    pub fn validate_find(&self) -> Result<(), QueryError> {
        let Some(order) = self.order.as_deref() else {
            return Ok(());
        };

        for (prop, clause) in &self.where_clauses {
            if prop != DEL_PROP && clause.defines_order() && prop != order {
                return Err(QueryError::IncompatibleOrder {
                    prop: prop.clone(),
                    order: order.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Clamp the limit to `max`.
    pub(crate) fn clamp_limit(&mut self, max: u32) {
        self.limit = self.limit.min(max);
    }

    pub(crate) fn clear_order(&mut self) {
        self.order = None;
    }

    pub(crate) const fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    pub(crate) fn set_page_key(&mut self, page: Option<Key>) {
        self.page = page;
    }
}

fn add_clause(
    map: &mut BTreeMap<String, WhereClause>,
    prop: &str,
    op: CompOp,
    value: Value,
    collation: Option<CollationStrength>,
) -> Result<(), QueryError> {
    if matches!(value, Value::Array(_)) && !matches!(op, CompOp::Eq | CompOp::Prefix) {
        return Err(QueryError::ArrayValueForNonEq {
            prop: prop.to_string(),
            op,
        });
    }

    map.entry(prop.to_string())
        .or_default()
        .add(prop, op, value, collation)
}
