//! Module: plan
//! Responsibility: turn a query and its chosen index into ordered key ranges.
//! Does not own: index selection (see `index::select_index`) or scanning.
//! Boundary: ranges come out in scan order, already clipped to the page key.

mod error;


use crate::{
    DEL_PROP,
    index::{IndexDescriptor, IndexId},
    key::{Key, KeyBuilder, KeyRange, KeySet},
    obs::sink::{self, MetricsEvent},
    query::{CompOp, Query, WhereClause},
    text::{Collator, TextProvider},
    value::Value,
};
use tracing::debug;

pub use error::PlanError;

///
/// QueryPlan
///
/// Ranges to scan for one query over one index, plus the facts the cursor
/// needs to interpret the keys it finds.
///

#[derive(Clone, Debug)]
pub struct QueryPlan {
    query: Query,
    index_id: IndexId,
    id_position: usize,
    group_count: u32,
    ranges: Vec<KeyRange>,
}

impl QueryPlan {
    /// Plan `query` against `index`.
    ///
    /// The index is assumed to answer the query; callers check that with
    /// `IndexDescriptor::can_answer` first.
    pub fn build(
        query: &Query,
        index: &IndexDescriptor,
        text: &dyn TextProvider,
    ) -> Result<Self, PlanError> {
        Self::build_for_locale(query, index, text, text.locale())
    }

    /// Plan `query` with collators and tokenizers made for `locale`.
    pub fn build_for_locale(
        query: &Query,
        index: &IndexDescriptor,
        text: &dyn TextProvider,
        locale: &str,
    ) -> Result<Self, PlanError> {
        query.validate()?;

        // Phase 1: delete-inclusive indexes hide deleted records by default.
        let mut query = query.clone();
        if index.include_deleted() && query.clause(DEL_PROP).is_none() {
            query = query.where_clause(DEL_PROP, CompOp::Eq, false)?;
        }

        // Phase 2: build ranges in ascending key order.
        let mut builder = RangeBuilder {
            page: query.page_key(),
            desc: query.is_desc(),
            locale,
            group_count: 0,
            ranges: Vec::new(),
        };
        builder.build(&query, index, text)?;

        // Phase 3: descending scans walk the same ranges back to front.
        let RangeBuilder {
            group_count,
            mut ranges,
            ..
        } = builder;
        if query.is_desc() {
            ranges.reverse();
        }

        debug!(
            target: "quarry::plan",
            index = index.name(),
            ranges = ranges.len(),
            groups = group_count,
            desc = query.is_desc(),
            "query plan built"
        );
        sink::record(MetricsEvent::PlanBuilt {
            ranges: ranges.len() as u64,
            search: group_count > 0,
        });

        Ok(Self {
            query,
            index_id: index.id(),
            id_position: index.id_position(),
            group_count,
            ranges,
        })
    }

    /// The query as planned, including any injected deletion-flag clause.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub const fn index_id(&self) -> IndexId {
        self.index_id
    }

    /// Number of values preceding `_id` in every key of this index.
    #[must_use]
    pub const fn id_position(&self) -> usize {
        self.id_position
    }

    /// Search groups whose id sets must be intersected; zero without search.
    #[must_use]
    pub const fn group_count(&self) -> u32 {
        self.group_count
    }

    #[must_use]
    pub fn ranges(&self) -> &[KeyRange] {
        &self.ranges
    }

    #[must_use]
    pub const fn desc(&self) -> bool {
        self.query.is_desc()
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.query.limit_value()
    }

    pub(crate) const fn set_limit(&mut self, limit: u32) {
        self.query.set_limit(limit);
    }
}

///
/// RangeBuilder
///

struct RangeBuilder<'q> {
    page: Option<&'q Key>,
    desc: bool,
    locale: &'q str,
    group_count: u32,
    ranges: Vec<KeyRange>,
}

impl RangeBuilder<'_> {
    fn build(
        &mut self,
        query: &Query,
        index: &IndexDescriptor,
        text: &dyn TextProvider,
    ) -> Result<(), PlanError> {
        let prefix = index.id().prefix_key();
        let mut lower = KeyBuilder::new();
        let mut upper = KeyBuilder::new();
        lower.push_key(prefix.clone());
        upper.push_key(prefix);

        let mut prefix_keys: Option<KeySet> = None;
        let mut last: Option<&WhereClause> = None;

        for prop in index.props() {
            let Some(clause) = query.clause(&prop.name) else {
                break;
            };
            let collator = clause
                .collation()
                .map(|strength| text.make_collator(self.locale, strength));
            let collator = collator.as_deref();
            last = Some(clause);

            let lower_op = clause.lower_op();
            if lower_op == Some(CompOp::Search) {
                let tokens = self.search_tokens(&prop.name, clause, text, collator)?;
                lower.push(&tokens);
                upper.push(&tokens);
                continue;
            }

            let widens = !matches!(lower_op, Some(CompOp::Eq | CompOp::Prefix));
            if widens {
                prefix_keys = Some(lower.keys().clone());
            }

            if let Some(bound) = clause.lower() {
                lower.push(&value_keys(&bound.value, collator)?);
            }
            if let Some(bound) = clause.upper().or_else(|| clause.lower()) {
                upper.push(&value_keys(&bound.value, collator)?);
            }

            // a range clause is always the last one the index can use
            if widens {
                break;
            }
        }

        let lower_keys = lower.into_keys();
        let upper_keys = upper.into_keys();
        let prefix_keys = prefix_keys.unwrap_or_else(|| lower_keys.clone());

        let triples = lower_keys
            .into_iter()
            .zip(upper_keys)
            .zip(prefix_keys);
        for (ordinal, ((lower, upper), prefix)) in (0u32..).zip(triples) {
            self.ranges_from_keys(lower, upper, prefix, ordinal, last)?;
        }

        Ok(())
    }

    // Tokens of a search clause, minus any that merely prefix the next one.
    fn search_tokens(
        &mut self,
        prop: &str,
        clause: &WhereClause,
        text: &dyn TextProvider,
        collator: Option<&dyn Collator>,
    ) -> Result<KeySet, PlanError> {
        let Some(Value::String(words)) = clause.lower().map(|b| &b.value) else {
            return Err(PlanError::SearchNotText {
                prop: prop.to_string(),
            });
        };

        let mut kept: Vec<Key> = Vec::new();
        for token in text.tokenizer(self.locale).tokenize(words, collator)? {
            if kept.last().is_some_and(|prev| prev.string_prefix_of(&token)) {
                kept.pop();
            }
            kept.push(token);
        }
        self.group_count = u32::try_from(kept.len()).unwrap_or(u32::MAX);

        Ok(kept.into_iter().collect())
    }

    fn ranges_from_keys(
        &mut self,
        lower: Key,
        upper: Key,
        mut prefix: Key,
        ordinal: u32,
        clause: Option<&WhereClause>,
    ) -> Result<(), PlanError> {
        let (lower_op, upper_op) =
            clause.map_or((Some(CompOp::Eq), None), |c| (c.lower_op(), c.upper_op()));

        let upper = match upper_op {
            Some(CompOp::Less) => upper,
            Some(_) => upper.increment()?,
            None => prefix.increment()?,
        };

        match lower_op {
            Some(op @ (CompOp::Eq | CompOp::Prefix | CompOp::Search)) => {
                let group = if op == CompOp::Search {
                    ordinal.checked_rem(self.group_count).unwrap_or(0)
                } else {
                    0
                };
                if op != CompOp::Eq {
                    prefix.strip_terminator();
                }
                let end = prefix.increment()?;
                self.add_range(lower, end, group);
            }
            Some(CompOp::NotEq) => {
                let end = prefix.increment()?;
                let after = lower.increment()?;
                self.add_range(prefix, lower, 0);
                self.add_range(after, end, 0);
            }
            Some(CompOp::Greater) => {
                let start = lower.increment()?;
                self.add_range(start, upper, 0);
            }
            // upper-only clauses start at the prefix, which `lower` still is
            Some(CompOp::GreaterEq | CompOp::Less | CompOp::LessEq) | None => {
                self.add_range(lower, upper, 0);
            }
        }

        Ok(())
    }

    fn add_range(&mut self, lower: Key, upper: Key, group: u32) {
        let mut range = KeyRange::new(lower, upper, group);
        let desc = self.desc;

        if let Some(page) = self.page {
            // drop ranges the previous page already covered
            let stop = range.stop_bound(desc);
            if !stop.is_empty() && (page <= stop) == desc {
                return;
            }
            // resume a straddling range exactly at the page key
            let seek = range.seek_bound(desc);
            if seek.is_empty() || (page < seek) == desc {
                *range.seek_bound_mut(desc) = page.clone();
            }
        }

        if range.is_void() {
            return;
        }
        // overlapping search prefixes can yield ranges nested in their predecessor
        if self.ranges.last().is_some_and(|prev| prev.contains_range(&range)) {
            return;
        }

        self.ranges.push(range);
    }
}

// One candidate key per value; array values fan out into one per element.
fn value_keys(value: &Value, collator: Option<&dyn Collator>) -> Result<KeySet, PlanError> {
    let keys = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| Key::from_value(item, collator))
            .collect::<Result<KeySet, _>>()?,
        scalar => KeySet::from([Key::from_value(scalar, collator)?]),
    };

    Ok(keys)
}
