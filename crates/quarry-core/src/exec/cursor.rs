use crate::{
    codec::{self, ValueReader},
    error::InternalError,
    exec::ExecServices,
    index::IndexId,
    key::{Key, KeyRange},
    obs::sink::{self, MetricsEvent},
    plan::QueryPlan,
    query::{PageToken, encode_cursor, matches_filter, project},
    record::DecodedRecord,
    store::{OrderedCollection, StoreCursor, StoreEntry},
    value::Value,
};
use tracing::{debug, warn};

///
/// CursorState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorState {
    /// Position the store cursor at the current range's seek bound.
    Seek,
    /// Step once in scan direction.
    Next,
    Exhausted,
}

///
/// ScanWarning
///
/// Recoverable conditions met during a scan.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanWarning {
    /// Index entry whose primary record is missing.
    GhostKey { key: Key },
}

///
/// QueryItem
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryItem {
    pub id: Value,
    pub key: Key,
    pub group: u32,
    pub record: DecodedRecord,
}

///
/// ScanOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanOutcome {
    Item(QueryItem),
    Warning(ScanWarning),
}

///
/// IdHit
/// Key-only hit: the id parsed out of an index key, plus its primary key.
///

#[derive(Clone, Debug)]
pub(crate) struct IdHit {
    pub id: Value,
    pub primary_key: Key,
    pub group: u32,
}

///
/// QueryCursor
///
/// Walks the ranges of one plan over an index collection. Records are
/// fetched from `primary` by id; without a primary collection the scanned
/// entry's own value is the record.
///

pub struct QueryCursor<'s> {
    plan: QueryPlan,
    index: &'s dyn OrderedCollection,
    primary: Option<&'s dyn OrderedCollection>,
    services: ExecServices<'s>,
    verify: bool,

    store: Option<Box<dyn StoreCursor + 's>>,
    state: CursorState,
    range: usize,
    current: Option<StoreEntry>,
    count: u32,
    end_key: Option<Key>,
    last_distinct: Option<Value>,
    warnings: Vec<ScanWarning>,
    range_keys: u64,
    closed: bool,
}

impl<'s> QueryCursor<'s> {
    #[must_use]
    pub fn new(
        plan: QueryPlan,
        index: &'s dyn OrderedCollection,
        primary: Option<&'s dyn OrderedCollection>,
        services: ExecServices<'s>,
        verify: bool,
    ) -> Self {
        Self {
            plan,
            index,
            primary,
            services,
            verify,
            store: None,
            state: CursorState::Seek,
            range: 0,
            current: None,
            count: 0,
            end_key: None,
            last_distinct: None,
            warnings: Vec::new(),
            range_keys: 0,
            closed: false,
        }
    }

    #[must_use]
    pub const fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    #[must_use]
    pub const fn state(&self) -> CursorState {
        self.state
    }

    /// Items counted against the limit so far.
    #[must_use]
    pub const fn counted(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    ///
    /// ITEMS
    ///

    /// Next qualifying item or ghost-key warning.
    pub fn next_outcome(&mut self) -> Result<Option<ScanOutcome>, InternalError> {
        loop {
            let Some((entry, group)) = self.next_key()? else {
                return Ok(None);
            };
            let (id, primary_key) = parse_id(&entry.key, self.plan.id_position())?;

            let bytes = match self.primary {
                Some(primary) => primary.get(&primary_key)?,
                None => Some(entry.value),
            };
            let Some(bytes) = bytes else {
                let warning = self.ghost_key(entry.key)?;
                return Ok(Some(ScanOutcome::Warning(warning)));
            };

            let record = self.services.decoder.decode(&bytes)?;
            if !self.admit(&record) {
                continue;
            }

            self.increment_count(&entry.key)?;
            let record = DecodedRecord {
                value: project(&record.value, self.plan.query().selected()),
                ..record
            };

            return Ok(Some(ScanOutcome::Item(QueryItem {
                id,
                key: entry.key,
                group,
                record,
            })));
        }
    }

    /// Next qualifying item; ghost keys are recorded in `warnings` and skipped.
    pub fn get(&mut self) -> Result<Option<QueryItem>, InternalError> {
        while let Some(outcome) = self.next_outcome()? {
            if let ScanOutcome::Item(item) = outcome {
                return Ok(Some(item));
            }
        }

        Ok(None)
    }

    /// Next id and search group, read from the key alone.
    pub fn get_id(&mut self) -> Result<Option<(Value, u32)>, InternalError> {
        Ok(self.next_id()?.map(|hit| (hit.id, hit.group)))
    }

    pub(crate) fn next_id(&mut self) -> Result<Option<IdHit>, InternalError> {
        let Some((entry, group)) = self.next_key()? else {
            return Ok(None);
        };
        let (id, primary_key) = parse_id(&entry.key, self.plan.id_position())?;
        self.increment_count(&entry.key)?;

        Ok(Some(IdHit {
            id,
            primary_key,
            group,
        }))
    }

    /// Exhaust the scan without a limit and return the qualifying total.
    pub fn count(&mut self) -> Result<u32, InternalError> {
        self.plan.set_limit(u32::MAX);
        while self.get()?.is_some() {}

        Ok(self.count)
    }

    /// Resume point after a limited scan; `None` when the limit never bit.
    #[must_use]
    pub fn next_page_token(&self) -> Option<PageToken> {
        if !self.limit_reached() {
            return None;
        }

        self.end_key.clone().map(PageToken::new)
    }

    /// Release the store cursor. Safe to call at any point, any number of times.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.finish_range();
        self.store = None;
        self.state = CursorState::Exhausted;

        debug!(
            target: "quarry::exec",
            index = %self.plan.index_id(),
            count = self.count,
            warnings = self.warnings.len(),
            "cursor closed"
        );
        sink::record(MetricsEvent::ItemsReturned {
            items: u64::from(self.count),
        });
    }

    pub(crate) const fn limit_reached(&self) -> bool {
        self.count >= self.plan.limit()
    }

    ///
    /// SCAN
    ///

    // Next key inside the active range, moving through ranges as they run out.
    fn next_key(&mut self) -> Result<Option<(StoreEntry, u32)>, InternalError> {
        let desc = self.plan.desc();

        while !self.limit_reached() {
            let found = match self.state {
                CursorState::Exhausted => break,
                CursorState::Seek => {
                    let Some(range) = self.plan.ranges().get(self.range) else {
                        self.state = CursorState::Exhausted;
                        break;
                    };
                    let bound = range.seek_bound(desc).clone();
                    self.seek(&bound, desc)?
                }
                CursorState::Next => self.step(desc)?,
            };
            self.current.clone_from(&found);

            let Some(entry) = found else {
                // ran off the end of the collection
                self.finish_range();
                self.state = CursorState::Exhausted;
                break;
            };
            if let Some(range) = self.plan.ranges().get(self.range)
                && within(range, &entry.key, desc)
            {
                self.range_keys += 1;
                return Ok(Some((entry, range.group)));
            }

            self.finish_range();
            self.range += 1;
            self.state = CursorState::Seek;
        }

        Ok(None)
    }

    fn seek(&mut self, bound: &Key, desc: bool) -> Result<Option<StoreEntry>, InternalError> {
        self.state = CursorState::Next;

        // the key that ended the previous range may already lie in this one
        if let Some(current) = &self.current
            && (current.key < *bound) == desc
        {
            return Ok(Some(current.clone()));
        }

        let store = self.store_cursor()?;
        let found = if !desc {
            if bound.is_empty() {
                store.seek_first()?
            } else {
                store.seek(bound)?
            }
        } else if bound.is_empty() {
            store.seek_last()?
        } else if store.seek(bound)?.is_some() {
            store.prev()?
        } else {
            // nothing at or above the bound: start from the last entry
            store.seek_last()?
        };

        Ok(found)
    }

    fn step(&mut self, desc: bool) -> Result<Option<StoreEntry>, InternalError> {
        let store = self.store_cursor()?;
        let found = if desc { store.prev()? } else { store.next()? };

        Ok(found)
    }

    fn store_cursor(&mut self) -> Result<&mut (dyn StoreCursor + 's), InternalError> {
        if self.store.is_none() {
            self.store = Some(self.index.cursor()?);
        }

        self.store
            .as_deref_mut()
            .ok_or_else(|| InternalError::executor_invariant("store cursor missing after open"))
    }

    fn finish_range(&mut self) {
        if self.range_keys > 0 {
            sink::record(MetricsEvent::RangeScanned {
                keys: self.range_keys,
            });
        }
        self.range_keys = 0;
    }

    ///
    /// ACCOUNTING
    ///

    // Kind exclusion, post-filter and distinct; limit is charged afterwards.
    fn admit(&mut self, record: &DecodedRecord) -> bool {
        let query = self.plan.query();
        if query.excluded_kinds().contains(&record.kind) {
            return false;
        }
        if !matches_filter(query.filter_clauses(), &record.value) {
            return false;
        }

        if let Some(prop) = query.distinct_prop() {
            let value = record.value.get_path(prop).cloned().unwrap_or_default();
            if self.last_distinct.as_ref() == Some(&value) {
                return false;
            }
            self.last_distinct = Some(value);
        }

        true
    }

    fn increment_count(&mut self, key: &Key) -> Result<(), InternalError> {
        self.count = self.count.saturating_add(1);
        if self.limit_reached() {
            // ascending resumes strictly after the key; descending pages stop before it
            let end = if self.plan.desc() {
                key.clone()
            } else {
                key.increment()?
            };
            self.end_key = Some(end);
        }

        Ok(())
    }

    fn ghost_key(&mut self, key: Key) -> Result<ScanWarning, InternalError> {
        report_ghost_key(self.plan.index_id(), &key);
        if self.verify {
            return Err(InternalError::ghost_key(key.as_bytes()));
        }
        let warning = ScanWarning::GhostKey { key };
        self.warnings.push(warning.clone());

        Ok(warning)
    }
}

impl Drop for QueryCursor<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

pub(crate) fn report_ghost_key(index: IndexId, key: &Key) {
    warn!(
        target: "quarry::exec",
        index = %index,
        key = %encode_cursor(key.as_bytes()),
        "index entry references a missing record"
    );
    sink::record(MetricsEvent::GhostKey);
}

// Whether `key` is short of the range's stop bound in scan direction.
fn within(range: &KeyRange, key: &Key, desc: bool) -> bool {
    let stop = range.stop_bound(desc);
    if stop.is_empty() {
        return true;
    }

    if desc { key >= stop } else { key < stop }
}

// Read the id at tuple ordinal `position`; returns it with its encoded bytes.
pub(crate) fn parse_id(key: &Key, position: usize) -> Result<(Value, Key), InternalError> {
    let malformed = |err: codec::CodecError| {
        InternalError::index_corruption(format!(
            "malformed index key {}: {err}",
            encode_cursor(key.as_bytes())
        ))
    };

    let bytes = key.as_bytes();
    let mut reader = ValueReader::new(bytes);
    for _ in 0..position {
        reader.skip_value().map_err(malformed)?;
    }
    let start = reader.position();
    reader.skip_value().map_err(malformed)?;
    let id_bytes = bytes
        .get(start..reader.position())
        .ok_or_else(|| InternalError::index_corruption("id slot outside index key"))?;
    let id = codec::decode(id_bytes).map_err(malformed)?;

    Ok((id, Key::from_bytes(id_bytes.to_vec())))
}
