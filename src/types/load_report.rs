//! Outcome of loading a batch of policy texts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseError;

use super::decision::PolicyVersion;

/// A policy text that was dropped from a load because it did not parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct SkippedPolicy {
    /// 1-based position of the text in the batch.
    pub index: usize,
    pub error: ParseError,
}

/// What a load did to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct LoadReport {
    /// Names of the policies that parsed, in source order.
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedPolicy>,
    /// The load produced no policies and the previous set was kept.
    pub retained_previous: bool,
    /// Version of the policy set active after the load.
    pub version: PolicyVersion,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Every text parsed and the new set is active.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && !self.retained_previous
    }
}
