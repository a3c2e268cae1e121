use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::metrics::{MetricsSink, NoopSink};

use super::PolicyEngine;

/// What a load that yields no policies does to the active set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailMode {
    /// Install whatever parsed, even an empty set. Every request is then denied.
    #[default]
    FailClosed,
    /// Keep the previous set when a load produces zero policies.
    KeepLastKnownGood,
}

#[derive(Clone)]
pub(crate) struct EngineConfig {
    pub fail_mode: FailMode,
    pub collect_diagnostics: bool,
    pub metrics_sink: Arc<dyn MetricsSink>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fail_mode: FailMode::default(),
            collect_diagnostics: true,
            metrics_sink: Arc::new(NoopSink),
        }
    }
}

impl Debug for EngineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EngineConfig")
            .field("fail_mode", &self.fail_mode)
            .field("collect_diagnostics", &self.collect_diagnostics)
            .finish_non_exhaustive()
    }
}

/// Configures a [`PolicyEngine`] before it is created.
///
/// ```rust
/// use sentinela_core::{FailMode, PolicyEngine};
///
/// let engine = PolicyEngine::builder()
///     .fail_mode(FailMode::KeepLastKnownGood)
///     .collect_diagnostics(false)
///     .build();
/// assert_eq!(engine.count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct PolicyEngineBuilder {
    config: EngineConfig,
}

impl PolicyEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_mode(mut self, fail_mode: FailMode) -> Self {
        self.config.fail_mode = fail_mode;
        self
    }

    /// Record every examined policy in [`Decision::diagnostics`](crate::types::Decision).
    /// Enabled by default.
    pub fn collect_diagnostics(mut self, collect: bool) -> Self {
        self.config.collect_diagnostics = collect;
        self
    }

    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.config.metrics_sink = sink;
        self
    }

    /// An engine with an empty policy set.
    pub fn build(self) -> PolicyEngine {
        PolicyEngine::with_config(self.config)
    }
}
