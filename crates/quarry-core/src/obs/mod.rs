//! Observability: query telemetry (metrics) and sink abstractions.
//!
//! Planner and executor code record `MetricsEvent`s through `sink` only;
//! nothing outside this module touches the counters directly.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
