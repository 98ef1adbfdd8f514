use crate::{
    error::InternalError,
    exec::{
        ExecServices,
        cursor::{IdHit, QueryCursor, QueryItem, ScanWarning, report_ghost_key},
    },
    index::IndexId,
    key::Key,
    obs::sink::{self, MetricsEvent},
    plan::QueryPlan,
    query::{matches_filter, project},
    record::DecodedRecord,
    store::OrderedCollection,
    text::{CollationStrength, Collator},
    value::Value,
};
use std::collections::{BTreeMap, VecDeque};
use tracing::warn;

///
/// SearchCursor
///
/// Full-text search over a multi-group plan. Ids are collected per group,
/// intersected, and the surviving records are sorted before the first item
/// is handed out. Search results never produce a page token.
///

pub struct SearchCursor<'s> {
    inner: QueryCursor<'s>,
    primary: &'s dyn OrderedCollection,
    services: ExecServices<'s>,
    verify: bool,
    order: Option<String>,
    limit: u32,

    items: Option<VecDeque<QueryItem>>,
    total: u32,
    returned: u32,
    warnings: Vec<ScanWarning>,
}

impl<'s> SearchCursor<'s> {
    /// `plan` must carry the id-collection cap as its limit; `order` and
    /// `limit` are applied to the intersected results.
    #[must_use]
    pub fn new(
        plan: QueryPlan,
        index: &'s dyn OrderedCollection,
        primary: &'s dyn OrderedCollection,
        services: ExecServices<'s>,
        verify: bool,
        order: Option<String>,
        limit: u32,
    ) -> Self {
        Self {
            inner: QueryCursor::new(plan, index, None, services, verify),
            primary,
            services,
            verify,
            order,
            limit,
            items: None,
            total: 0,
            returned: 0,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub const fn plan(&self) -> &QueryPlan {
        self.inner.plan()
    }

    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub fn get(&mut self) -> Result<Option<QueryItem>, InternalError> {
        if self.returned >= self.limit {
            return Ok(None);
        }
        let next = self.items()?.pop_front();
        if next.is_some() {
            self.returned = self.returned.saturating_add(1);
        }

        Ok(next)
    }

    /// Number of matching records, ignoring the limit.
    pub fn count(&mut self) -> Result<u32, InternalError> {
        self.items()?;

        Ok(self.total)
    }

    pub fn close(&mut self) {
        self.inner.close();
        self.items = Some(VecDeque::new());
    }

    fn items(&mut self) -> Result<&mut VecDeque<QueryItem>, InternalError> {
        if self.items.is_none() {
            let items = self.load()?;
            self.inner.close();
            self.total = u32::try_from(items.len()).unwrap_or(u32::MAX);
            self.items = Some(items);
        }

        self.items
            .as_mut()
            .ok_or_else(|| InternalError::executor_invariant("search results missing after load"))
    }

    ///
    /// LOAD
    ///

    fn load(&mut self) -> Result<VecDeque<QueryItem>, InternalError> {
        // Phase 1: collect ids per group, keyed by primary key.
        let group_count = self.inner.plan().group_count();
        let mut groups: BTreeMap<u32, BTreeMap<Key, Value>> = BTreeMap::new();
        while let Some(IdHit {
            id,
            primary_key,
            group,
        }) = self.inner.next_id()?
        {
            groups.entry(group).or_default().insert(primary_key, id);
        }
        if self.inner.limit_reached() {
            let cap = self.inner.plan().limit();
            warn!(
                target: "quarry::exec",
                index = %self.inner.plan().index_id(),
                cap,
                "search result cap reached; results are truncated"
            );
            sink::record(MetricsEvent::SearchCapped {
                cap: u64::from(cap),
            });
        }

        // Phase 2: every group must match.
        let Some(mut hits) = groups.remove(&0) else {
            return Ok(VecDeque::new());
        };
        for group in 1..group_count {
            let Some(ids) = groups.get(&group) else {
                return Ok(VecDeque::new());
            };
            hits.retain(|key, _| ids.contains_key(key));
        }

        // Phase 3: fetch and filter records.
        let index_id = self.inner.plan().index_id();
        let mut records = Vec::with_capacity(hits.len());
        for (primary_key, id) in hits {
            let Some(bytes) = self.primary.get(&primary_key)? else {
                self.ghost_key(index_id, primary_key)?;
                continue;
            };
            let record = self.services.decoder.decode(&bytes)?;
            if self.admit(&record) {
                records.push((id, primary_key, record));
            }
        }

        // Phase 4: order, direction, distinct.
        if let Some(order) = &self.order {
            let collator = self
                .services
                .text
                .make_collator(self.services.locale, CollationStrength::Primary);
            records.sort_by_cached_key(|(_, _, record)| {
                order_key(record.value.get_path(order), collator.as_ref())
            });
        }
        if self.inner.plan().desc() {
            records.reverse();
        }
        if let Some(prop) = self.inner.plan().query().distinct_prop() {
            records.dedup_by(|(_, _, next), (_, _, kept)| {
                next.value.get_path(prop).unwrap_or(&Value::Null)
                    == kept.value.get_path(prop).unwrap_or(&Value::Null)
            });
        }

        let selected = self.inner.plan().query().selected();
        Ok(records
            .into_iter()
            .map(|(id, key, record)| QueryItem {
                id,
                key,
                group: 0,
                record: DecodedRecord {
                    value: project(&record.value, selected),
                    ..record
                },
            })
            .collect())
    }

    fn admit(&self, record: &DecodedRecord) -> bool {
        let query = self.inner.plan().query();

        !query.excluded_kinds().contains(&record.kind)
            && matches_filter(query.filter_clauses(), &record.value)
    }

    fn ghost_key(&mut self, index: IndexId, key: Key) -> Result<(), InternalError> {
        report_ghost_key(index, &key);
        if self.verify {
            return Err(InternalError::ghost_key(key.as_bytes()));
        }
        self.warnings.push(ScanWarning::GhostKey { key });

        Ok(())
    }
}

// Sort key of the order prop. Arrays sort by their first element; values
// that are not key material sort first.
fn order_key(value: Option<&Value>, collator: &dyn Collator) -> Key {
    let value = match value {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };

    Key::from_value(value.unwrap_or(&Value::Null), Some(collator)).unwrap_or_default()
}
