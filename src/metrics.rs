// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the proxy rule API.
//!
//! Every metric carries the `proxyrule_` prefix and is registered in
//! [`METRICS_REGISTRY`], which the HTTP server exposes at `/metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use proxyrule_api::metrics::{gather_metrics, record_operation, Outcome};
//!
//! record_operation("create", Outcome::Success, std::time::Duration::from_millis(3));
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

use crate::rule_errors::RuleError;

/// Prefix for all metric names
const METRICS_NAMESPACE: &str = "proxyrule";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of rule operations by operation and outcome
///
/// Labels:
/// - `operation`: `create`, `update`, `delete`, `get`, `list`
/// - `outcome`: `success` or the failure reason (e.g. `DomainConflict`)
pub static OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_operations_total"),
        "Total number of proxy rule operations by operation and outcome",
    );
    let counter = CounterVec::new(opts, &["operation", "outcome"])
        .expect("operations counter descriptor is valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("operations counter registers once");
    counter
});

/// Duration of rule operations in seconds
///
/// Labels:
/// - `operation`: `create`, `update`, `delete`, `get`, `list`
pub static OPERATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_operation_duration_seconds"),
        "Duration of proxy rule operations in seconds by operation",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]);
    let histogram = HistogramVec::new(opts, &["operation"])
        .expect("duration histogram descriptor is valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("duration histogram registers once");
    histogram
});

/// Number of live rules seen by the most recent list
pub static LIVE_RULES: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_live_rules"),
        "Number of live proxy rules observed by the last list operation",
    )
    .expect("live rules gauge descriptor is valid");
    METRICS_REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("live rules gauge registers once");
    gauge
});

/// Result label of a recorded operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Failed with the given reason
    Failure(&'static str),
}

impl Outcome {
    /// Outcome label for the result of a manager operation.
    #[must_use]
    pub fn of<T>(result: &Result<T, RuleError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => Self::Failure(e.status_reason()),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(reason) => reason,
        }
    }
}

/// Record one completed operation.
///
/// # Arguments
/// * `operation` - Operation name (e.g., `create`)
/// * `outcome` - How it ended
/// * `duration` - Wall time spent in the operation
pub fn record_operation(operation: &str, outcome: Outcome, duration: Duration) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome.label()])
        .inc();
    OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Record how many rules a list operation returned.
#[allow(clippy::cast_precision_loss)]
pub fn set_live_rules(count: usize) {
    LIVE_RULES.set(count as f64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    // Register every metric before the first operation
    LazyLock::force(&OPERATIONS_TOTAL);
    LazyLock::force(&OPERATION_DURATION_SECONDS);
    LazyLock::force(&LIVE_RULES);

    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
