//! Immutable policy sets as seen by evaluation.

use serde::Serialize;

use super::decision::PolicyVersion;
use super::policy::Policy;

/// One fully loaded policy set, in source order.
///
/// Snapshots are never modified; a reload replaces the engine's snapshot as a
/// whole, so holders of an older snapshot keep seeing the old set.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySnapshot {
    policies: Vec<Policy>,
    version: PolicyVersion,
}

impl PolicySnapshot {
    pub(crate) fn new(policies: Vec<Policy>, version: PolicyVersion) -> Self {
        PolicySnapshot { policies, version }
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn version(&self) -> &PolicyVersion {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// The first policy with this name.
    pub fn get(&self, name: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.name() == name)
    }
}
