//! Policies that apply to one principal.

use itertools::Itertools;
use serde::Serialize;

use super::entity_ref::EntityRef;
use super::policy::Policy;

/// The policies whose principal scope can match a given principal, and the
/// actions they name, deduplicated and sorted.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalPolicies {
    principal: EntityRef,
    policies: Vec<Policy>,
    actions: Vec<EntityRef>,
}

impl PrincipalPolicies {
    pub fn new(principal: EntityRef, policies: Vec<Policy>) -> Self {
        let actions = policies
            .iter()
            // Unconstrained actions name nothing in particular.
            .filter_map(|p| p.action().entity().cloned())
            .unique()
            .sorted()
            .collect();

        PrincipalPolicies {
            principal,
            policies,
            actions,
        }
    }

    pub fn principal(&self) -> &EntityRef {
        &self.principal
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn actions(&self) -> &[EntityRef] {
        &self.actions
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Get the actions as a sorted list of strings.
    pub fn actions_by_name(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|a| a.to_string())
            .sorted()
            .collect()
    }

    /// Get the policy names as a sorted list.
    pub fn policies_by_name(&self) -> Vec<String> {
        self.policies
            .iter()
            .map(|p| p.name().to_string())
            .sorted()
            .collect()
    }
}
