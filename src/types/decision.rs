//! Authorization decision types with audit diagnostics.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::policy::{Effect, ScopeSlot};

/// Version metadata for the policy set used during an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub struct PolicyVersion {
    /// SHA-256 of the policy source text(s).
    pub hash: String,
    /// When this policy set was loaded into the engine (RFC 3339, UTC).
    pub loaded_at: String,
}

impl Display for PolicyVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} @ {}", self.hash, self.loaded_at)
    }
}

/// Why one scope slot of a policy matched the request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMatchReason {
    PrincipalAny,
    PrincipalEq,
    PrincipalIn,
    ActionAny,
    ActionEq,
    ActionIn,
    ResourceAny,
    ResourceEq,
    ResourceIn,
}

/// What happened when one policy was examined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PolicyOutcome {
    /// Scope and all conditions matched: the policy fired.
    Matched { reasons: Vec<PolicyMatchReason> },
    /// The first scope slot that did not match.
    ScopeMismatch { slot: ScopeSlot },
    /// Scope matched but this `when` condition was false.
    WhenFailed { condition: String },
    /// Scope matched but this `unless` condition was true.
    UnlessTriggered { condition: String },
}

/// One audit line: a policy that was examined and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub struct PolicyDiagnostic {
    pub policy: String,
    pub effect: Effect,
    pub outcome: PolicyOutcome,
}

impl PolicyDiagnostic {
    /// Scope matched, but a `when`/`unless` condition kept the policy from firing.
    pub fn is_condition_failure(&self) -> bool {
        matches!(
            self.outcome,
            PolicyOutcome::WhenFailed { .. } | PolicyOutcome::UnlessTriggered { .. }
        )
    }
}

/// Allow or deny, the deciding policy, and the examined-policy trail.
///
/// `reason` is the name of the permitting policy, `forbidden by <name>`, or
/// `no matching policy`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub struct Decision {
    pub allow: bool,
    pub reason: String,
    /// The policy that decided the outcome, if any did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Examined policies in examination order; empty when collection is disabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<PolicyDiagnostic>,
    pub version: PolicyVersion,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        self.allow
    }

    /// Policies whose scope matched the request but whose conditions did not.
    pub fn condition_failures(&self) -> impl Iterator<Item = &PolicyDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_condition_failure())
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let verdict = if self.allow { "Allow" } else { "Deny" };
        write!(f, "{verdict}({}; hash={})", self.reason, self.version.hash)
    }
}
