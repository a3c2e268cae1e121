//! Vendor-agnostic metrics collection via a pluggable sink.
//!
//! Each [`PolicyEngine`](crate::PolicyEngine) carries its own sink, installed
//! through [`PolicyEngineBuilder::metrics_sink`](crate::PolicyEngineBuilder::metrics_sink).
//! Engines built without one use [`NoopSink`].
//!
//! ## Usage
//!
//! ```rust
//! use sentinela_core::metrics::{EvaluationStats, MetricsSink, ReloadStats};
//! use sentinela_core::PolicyEngine;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct CounterSink {
//!     evaluations: AtomicU64,
//!     allows: AtomicU64,
//!     reloads: AtomicU64,
//! }
//!
//! impl MetricsSink for CounterSink {
//!     fn on_evaluation(&self, stats: &EvaluationStats) {
//!         self.evaluations.fetch_add(1, Ordering::Relaxed);
//!         if stats.allowed {
//!             self.allows.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn on_reload(&self, _stats: &ReloadStats) {
//!         self.reloads.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let sink = Arc::new(CounterSink::default());
//! let engine = PolicyEngine::builder().metrics_sink(sink.clone()).build();
//! engine.load(["permit(principal, action, resource);"]);
//! assert_eq!(sink.reloads.load(Ordering::Relaxed), 1);
//! ```
//!
//! For Prometheus or OpenTelemetry, implement a sink that records to your
//! client, or pipe the engine's [`tracing`] events to a collector.

use std::time::{Duration, SystemTime};

use serde::Serialize;

/// One policy evaluation, passed to [`MetricsSink::on_evaluation`].
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStats {
    /// Total time spent evaluating the request
    pub duration: Duration,
    /// Whether the decision was allow
    pub allowed: bool,
    /// Principal reference, e.g. `User::"alice"`
    pub principal: String,
    /// Action reference, e.g. `Action::"read"`
    pub action: String,
    /// The deciding policy, if any
    pub policy: Option<String>,
}

/// One completed `load`, `load_from_str` or `clear`.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadStats {
    /// Time when the reload completed
    pub reload_time: SystemTime,
    /// Policies installed by this reload
    pub loaded: usize,
    /// Policy texts that failed to parse and were dropped
    pub skipped: usize,
    /// The previous snapshot was kept instead of installing the new one
    pub retained_previous: bool,
}

/// Consumer of evaluation and reload metrics.
///
/// Called synchronously on the evaluating thread, so implementations must be
/// thread-safe and should return quickly.
pub trait MetricsSink: Send + Sync {
    /// Called after every evaluation, regardless of the outcome.
    fn on_evaluation(&self, stats: &EvaluationStats);

    /// Called after every reload, including failed ones that kept the
    /// previous snapshot.
    fn on_reload(&self, stats: &ReloadStats);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn on_evaluation(&self, _stats: &EvaluationStats) {}
    fn on_reload(&self, _stats: &ReloadStats) {}
}
