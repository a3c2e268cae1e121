use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Instant, SystemTime};

use arc_swap::ArcSwap;
use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::error::PolicyError;
use crate::evaluator;
use crate::loader;
use crate::metrics::{EvaluationStats, ReloadStats};
use crate::policy_match::principal_could_match;
use crate::types::{
    Decision, EntityRef, LoadReport, Policy, PolicySnapshot, PolicySummary, PolicyVersion,
    PrincipalPolicies, Request, SkippedPolicy,
};

mod builder;

pub use builder::{FailMode, PolicyEngineBuilder};
pub(crate) use builder::EngineConfig;

struct EngineInner {
    snapshot: ArcSwap<PolicySnapshot>,
    // Serializes writers; readers never take it.
    writer: Mutex<()>,
    config: EngineConfig,
}

/// The main engine handle. Cloneable and thread-safe.
///
/// Clones share the same policy set. Evaluation reads the current snapshot
/// without locking; `load`, `load_from_str` and `clear` replace it atomically.
#[derive(Clone)]
pub struct PolicyEngine {
    inner: Arc<EngineInner>,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for PolicyEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let snapshot = self.inner.snapshot.load();
        f.debug_struct("PolicyEngine")
            .field("policies", &snapshot.len())
            .field("version", snapshot.version())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl PolicyEngine {
    /// An empty engine with default configuration. Denies everything until loaded.
    pub fn new() -> Self {
        PolicyEngineBuilder::default().build()
    }

    pub fn builder() -> PolicyEngineBuilder {
        PolicyEngineBuilder::new()
    }

    pub(crate) fn with_config(config: EngineConfig) -> Self {
        let empty = PolicySnapshot::new(
            Vec::new(),
            PolicyVersion {
                hash: loader::document_hash(""),
                loaded_at: now_rfc3339(),
            },
        );
        PolicyEngine {
            inner: Arc::new(EngineInner {
                snapshot: ArcSwap::from_pointee(empty),
                writer: Mutex::new(()),
                config,
            }),
        }
    }

    /// Create an engine from a policy document, failing on the first parse error.
    pub fn new_from_str(policy_text: &str) -> Result<Self, PolicyError> {
        let engine = Self::new();
        engine.load_from_str(policy_text)?;
        Ok(engine)
    }

    /// Replace the policy set with the policies parsed from `texts`, one policy
    /// per text. Texts that fail to parse are skipped and reported.
    pub fn load<I, S>(&self, texts: I) -> LoadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let batch = loader::compile_batch(texts);
        let report = self.install(batch.policies, batch.hash, batch.skipped);
        self.record_reload(&report);
        report
    }

    /// Replace the policy set with all policies in one document.
    ///
    /// Unlike [`load`](Self::load) this is all or nothing: on a parse error the
    /// current set stays active and the error is returned.
    pub fn load_from_str(&self, policy_text: &str) -> Result<LoadReport, PolicyError> {
        let _guard = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let policies = match loader::compile_policies(policy_text) {
            Ok(policies) => policies,
            Err(error) => {
                warn!(
                    event = "Load",
                    phase = "Compile",
                    line = error.line,
                    column = error.column,
                    error = error.message.as_str(),
                    "policy document rejected, keeping current policies"
                );
                self.inner.config.metrics_sink.on_reload(&ReloadStats {
                    reload_time: SystemTime::now(),
                    loaded: 0,
                    skipped: 1,
                    retained_previous: true,
                });
                return Err(error.into());
            }
        };

        let report = self.install(policies, loader::document_hash(policy_text), Vec::new());
        self.record_reload(&report);
        Ok(report)
    }

    /// Drop every policy. Subsequent requests are denied by default.
    pub fn clear(&self) -> PolicyVersion {
        let _guard = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let version = PolicyVersion {
            hash: loader::document_hash(""),
            loaded_at: now_rfc3339(),
        };
        self.inner
            .snapshot
            .store(Arc::new(PolicySnapshot::new(Vec::new(), version.clone())));
        info!(event = "Load", phase = "Clear", hash = version.hash.as_str());
        self.record_reload(&LoadReport {
            loaded: Vec::new(),
            skipped: Vec::new(),
            retained_previous: false,
            version: version.clone(),
        });
        version
    }

    /// Swap in a new snapshot, honouring the fail mode. Callers hold the writer lock.
    fn install(
        &self,
        policies: Vec<Policy>,
        hash: String,
        skipped: Vec<SkippedPolicy>,
    ) -> LoadReport {
        if policies.is_empty() && self.inner.config.fail_mode == FailMode::KeepLastKnownGood {
            let current = self.inner.snapshot.load();
            warn!(
                event = "Load",
                phase = "Install",
                skipped = skipped.len(),
                kept = current.len(),
                "load produced no policies, keeping the previous set"
            );
            return LoadReport {
                loaded: Vec::new(),
                skipped,
                retained_previous: true,
                version: current.version().clone(),
            };
        }

        let version = PolicyVersion {
            hash,
            loaded_at: now_rfc3339(),
        };
        let loaded: Vec<String> = policies.iter().map(|p| p.name().to_string()).collect();
        self.inner
            .snapshot
            .store(Arc::new(PolicySnapshot::new(policies, version.clone())));

        info!(
            event = "Load",
            phase = "Install",
            loaded = loaded.len(),
            skipped = skipped.len(),
            hash = version.hash.as_str()
        );

        LoadReport {
            loaded,
            skipped,
            retained_previous: false,
            version,
        }
    }

    fn record_reload(&self, report: &LoadReport) {
        self.inner.config.metrics_sink.on_reload(&ReloadStats {
            reload_time: SystemTime::now(),
            loaded: report.loaded_count(),
            skipped: report.skipped_count(),
            retained_previous: report.retained_previous,
        });
    }

    /// Decide `request` against the current policy set. Always returns a decision.
    pub fn evaluate(&self, request: &Request) -> Decision {
        let start = Instant::now();
        let snapshot = self.inner.snapshot.load();
        let decision =
            evaluator::evaluate_with(&snapshot, request, self.inner.config.collect_diagnostics);
        let duration = start.elapsed();

        debug!(
            event = "Request",
            phase = "Complete",
            allow = decision.allow,
            duration_us = duration.as_micros() as u64
        );

        self.inner.config.metrics_sink.on_evaluation(&EvaluationStats {
            duration,
            allowed: decision.allow,
            principal: request.principal.to_string(),
            action: request.action.to_string(),
            policy: decision.policy.clone(),
        });

        decision
    }

    /// The active snapshot. It stays valid and unchanged across later reloads.
    pub fn current_snapshot(&self) -> Arc<PolicySnapshot> {
        self.inner.snapshot.load_full()
    }

    pub fn current_version(&self) -> PolicyVersion {
        self.inner.snapshot.load().version().clone()
    }

    pub fn count(&self) -> usize {
        self.inner.snapshot.load().len()
    }

    /// Summaries of the active policies, in load order.
    pub fn list(&self) -> Vec<PolicySummary> {
        self.inner
            .snapshot
            .load()
            .policies()
            .iter()
            .map(PolicySummary::from)
            .collect()
    }

    pub fn policies(&self) -> Vec<Policy> {
        self.inner.snapshot.load().policies().to_vec()
    }

    /// The first active policy named `name`.
    pub fn policy(&self, name: &str) -> Option<Policy> {
        self.inner.snapshot.load().get(name).cloned()
    }

    /// Policies whose principal scope could match `principal`.
    pub fn policies_for_principal(&self, principal: &EntityRef) -> PrincipalPolicies {
        let snapshot = self.inner.snapshot.load();
        let matching = snapshot
            .policies()
            .iter()
            .filter(|p| principal_could_match(p.principal(), principal))
            .cloned()
            .collect();
        PrincipalPolicies::new(principal.clone(), matching)
    }
}

/// Decide `request` against the engine's current policy set.
pub fn evaluate(engine: &PolicyEngine, request: &Request) -> Decision {
    engine.evaluate(request)
}

#[cfg(test)]
mod tests;
