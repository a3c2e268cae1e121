//! Data model types for requests, policies and decisions.
//!
//! Canonical string forms:
//! - Entity reference: `User::"alice"`, `NS::User::"alice"`, or the type wildcard `Document::*`
//! - Scope clause: `principal`, `action == Action::"read"`, `resource in Document::*`
//! - Condition: `principal.hasGroup == "employees"`, `context.region in ["eu", "us"]`

mod action;
mod attr_value;
mod decision;
mod entity_ref;
mod load_report;
mod policy;
mod policy_summary;
mod principal_policies;
mod request;
pub(crate) mod request_context;
mod snapshot;
mod user;

pub use action::Action;
pub use attr_value::AttrValue;
pub use decision::{Decision, PolicyDiagnostic, PolicyMatchReason, PolicyOutcome, PolicyVersion};
pub use entity_ref::EntityRef;
pub use load_report::{LoadReport, SkippedPolicy};
pub use policy::{Condition, ConditionTarget, Effect, Operator, Policy, ScopeConstraint, ScopeSlot};
pub use policy_summary::PolicySummary;
pub use principal_policies::PrincipalPolicies;
pub use request::Request;
pub use request_context::{GROUPS_KEY, RequestContext};
pub use snapshot::PolicySnapshot;
pub use user::User;
