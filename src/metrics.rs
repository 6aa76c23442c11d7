// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the `DuckType` controller.
//!
//! All metrics use the namespace prefix `discovery_knative_dev_` (prometheus-safe
//! version of "discovery.knative.dev").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - outcome counts and pass duration
//! - **Tracking Metrics** - size of the dependency index
//!
//! # Example
//!
//! ```rust,no_run
//! use discovery::metrics::{record_reconciliation, ReconcileOutcome};
//!
//! record_reconciliation(ReconcileOutcome::Reconciled, std::time::Duration::from_millis(3));
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "discovery_knative_dev";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by outcome
///
/// Labels:
/// - `outcome`: `reconciled`, `unavailable` or `error`
/// - `error_kind`: error category for `error` outcomes, empty otherwise
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of DuckType reconciliations by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome", "error_kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `outcome`: `reconciled`, `unavailable` or `error`
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of DuckType reconciliations in seconds",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Tracking Metrics
// ============================================================================

/// Number of distinct references held by the dependency tracker
pub static TRACKED_REFERENCES: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_tracked_references"),
        "Number of distinct references held by the dependency tracker",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Outcome of one reconciliation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Service found, address published
    Reconciled,
    /// Service missing, `Available=False`
    Unavailable,
    /// Pass failed and will be retried; carries the error category
    Error(&'static str),
}

impl ReconcileOutcome {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Reconciled => "reconciled",
            Self::Unavailable => "unavailable",
            Self::Error(_) => "error",
        }
    }
}

/// Record a finished reconciliation pass
///
/// # Arguments
/// * `outcome` - What the pass concluded
/// * `duration` - Wall time of the pass
pub fn record_reconciliation(outcome: ReconcileOutcome, duration: Duration) {
    let error_kind = match outcome {
        ReconcileOutcome::Error(kind) => kind,
        _ => "",
    };
    RECONCILIATION_TOTAL
        .with_label_values(&[outcome.label(), error_kind])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[outcome.label()])
        .observe(duration.as_secs_f64());
}

/// Record the current size of the dependency index
#[allow(clippy::cast_precision_loss)]
pub fn record_tracked_references(count: usize) {
    TRACKED_REFERENCES.set(count as f64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
