use crate::{
    config::QueryConfig,
    error::InternalError,
    exec::{
        ExecServices,
        cursor::{QueryCursor, QueryItem, ScanWarning},
        search::SearchCursor,
    },
    index::{IndexDescriptor, select_index},
    plan::{PlanError, QueryPlan},
    query::{PageToken, Query},
    store::StorageTxn,
};

///
/// FindCursor
///
/// Result of `find`: an ordered index scan, or a search over intersected groups.
///

pub enum FindCursor<'s> {
    Scan(QueryCursor<'s>),
    Search(SearchCursor<'s>),
}

impl FindCursor<'_> {
    pub fn get(&mut self) -> Result<Option<QueryItem>, InternalError> {
        match self {
            Self::Scan(cursor) => cursor.get(),
            Self::Search(cursor) => cursor.get(),
        }
    }

    pub fn count(&mut self) -> Result<u32, InternalError> {
        match self {
            Self::Scan(cursor) => cursor.count(),
            Self::Search(cursor) => cursor.count(),
        }
    }

    #[must_use]
    pub fn next_page_token(&self) -> Option<PageToken> {
        match self {
            Self::Scan(cursor) => cursor.next_page_token(),
            Self::Search(_) => None,
        }
    }

    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        match self {
            Self::Scan(cursor) => cursor.warnings(),
            Self::Search(cursor) => cursor.warnings(),
        }
    }

    #[must_use]
    pub const fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    pub fn close(&mut self) {
        match self {
            Self::Scan(cursor) => cursor.close(),
            Self::Search(cursor) => cursor.close(),
        }
    }
}

/// Run `query` against the first index in `indexes` that can answer it.
///
/// Collections are resolved through `config.layout`, text services run in
/// `config.locale`, and the query limit is clamped to `config.max_query_limit`.
pub fn find<'s>(
    txn: &'s dyn StorageTxn,
    indexes: &[IndexDescriptor],
    query: &Query,
    services: ExecServices<'s>,
    config: &'s QueryConfig,
) -> Result<FindCursor<'s>, InternalError> {
    let services = services.with_locale(&config.locale);
    let search = query.has_search();
    if !search {
        query.validate_find()?;
    }

    let mut query = query.clone();
    if let Some(max) = config.max_query_limit {
        query.clamp_limit(max);
    }

    // Search ranges are unordered and unpaged; order and limit apply after intersection.
    let mut planned = query.clone();
    if search {
        planned.clear_order();
        planned.set_limit(config.max_search_results);
        planned.set_page_key(None);
    }

    let index = select_index(indexes, &planned).ok_or_else(|| PlanError::NoCompatibleIndex {
        kind: query.from_kind().to_string(),
    })?;
    let plan = QueryPlan::build_for_locale(&planned, index, services.text, services.locale)?;

    let index_coll = txn.collection(&config.layout.index)?;
    let primary = txn.collection(&config.layout.primary)?;

    let cursor = if search {
        FindCursor::Search(SearchCursor::new(
            plan,
            index_coll,
            primary,
            services,
            config.verify_index,
            query.order_prop().map(str::to_string),
            query.limit_value(),
        ))
    } else {
        FindCursor::Scan(QueryCursor::new(
            plan,
            index_coll,
            Some(primary),
            services,
            config.verify_index,
        ))
    };

    Ok(cursor)
}
