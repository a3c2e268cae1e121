//! Read-only policy descriptions for authoring UIs and management APIs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::policy::{Effect, Policy, ScopeSlot};

/// A compact description of one loaded policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PolicySummary {
    pub name: String,
    pub effect: Effect,
    /// Scope clauses as written, e.g. `principal in User::"alice"`.
    pub principal: String,
    pub action: String,
    pub resource: String,
    pub when_conditions: usize,
    pub unless_conditions: usize,
    pub conditions: usize,
}

impl From<&Policy> for PolicySummary {
    fn from(policy: &Policy) -> Self {
        PolicySummary {
            name: policy.name().to_string(),
            effect: policy.effect(),
            principal: policy.principal().render(ScopeSlot::Principal),
            action: policy.action().render(ScopeSlot::Action),
            resource: policy.resource().render(ScopeSlot::Resource),
            when_conditions: policy.when().len(),
            unless_conditions: policy.unless().len(),
            conditions: policy.condition_count(),
        }
    }
}
