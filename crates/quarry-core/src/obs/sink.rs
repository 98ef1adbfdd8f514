//! Metrics sink boundary.
//!
//! Planner and executor code MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    PlanBuilt { ranges: u64, search: bool },
    RangeScanned { keys: u64 },
    ItemsReturned { items: u64 },
    GhostKey,
    SearchCapped { cap: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::PlanBuilt { ranges, search } => {
                m.ops.plans_built = m.ops.plans_built.saturating_add(1);
                m.ops.ranges_planned = m.ops.ranges_planned.saturating_add(ranges);
                if search {
                    m.ops.search_plans = m.ops.search_plans.saturating_add(1);
                }
            }
            MetricsEvent::RangeScanned { keys } => {
                m.ops.ranges_scanned = m.ops.ranges_scanned.saturating_add(1);
                m.ops.keys_scanned = m.ops.keys_scanned.saturating_add(keys);
            }
            MetricsEvent::ItemsReturned { items } => {
                m.ops.items_returned = m.ops.items_returned.saturating_add(items);
            }
            MetricsEvent::GhostKey => {
                m.ops.ghost_keys = m.ops.ghost_keys.saturating_add(1);
            }
            MetricsEvent::SearchCapped { .. } => {
                m.ops.search_capped = m.ops.search_capped.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Route one event to the scoped override, or to the global counters.
pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // `ptr` was installed by `with_metrics_sink` from a live shared borrow,
        // and the guard there clears it before that borrow ends, on unwind too.
        // The reference built here does not outlive this synchronous call.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Only the lifetime is erased. The pointer is dereferenced by `record`
    // while `sink` is still borrowed, since `Guard` restores the previous
    // slot before this function returns or unwinds.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
