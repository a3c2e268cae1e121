//! Decision algorithm over one immutable policy snapshot.
//!
//! Precedence is fixed: any firing `forbid` denies, otherwise the first firing
//! `permit` (in load order) allows, otherwise the request is denied by default.

use std::borrow::Cow;

use tracing::{debug, info};

use crate::policy_match::scope_match_reason;
use crate::types::{
    AttrValue, Condition, ConditionTarget, Decision, Effect, EntityRef, Operator, Policy,
    PolicyDiagnostic, PolicyOutcome, PolicySnapshot, Request, ScopeSlot, GROUPS_KEY,
};

/// Reason given when no policy decided the request.
pub const NO_MATCHING_POLICY: &str = "no matching policy";

const SLOTS: [ScopeSlot; 3] = [ScopeSlot::Principal, ScopeSlot::Action, ScopeSlot::Resource];

/// Evaluate `request` against `snapshot`, collecting diagnostics.
///
/// Never fails: an empty snapshot or a request nothing matches is a deny.
pub fn evaluate_snapshot(snapshot: &PolicySnapshot, request: &Request) -> Decision {
    evaluate_with(snapshot, request, true)
}

pub(crate) fn evaluate_with(
    snapshot: &PolicySnapshot,
    request: &Request,
    collect_diagnostics: bool,
) -> Decision {
    debug!(
        event = "Request",
        phase = "Evaluation",
        principal = request.principal.to_string(),
        action = request.action.to_string(),
        resource = request.resource.to_string(),
        context_keys = request.context.len(),
        policies = snapshot.len()
    );

    let mut diagnostics = Vec::new();
    let mut record = |policy: &Policy, outcome: &PolicyOutcome| {
        if collect_diagnostics {
            diagnostics.push(PolicyDiagnostic {
                policy: policy.name().to_string(),
                effect: policy.effect(),
                outcome: outcome.clone(),
            });
        }
    };

    let forbids = snapshot
        .policies()
        .iter()
        .filter(|p| p.effect() == Effect::Forbid);
    for policy in forbids {
        let outcome = policy_outcome(policy, request);
        record(policy, &outcome);
        if matches!(outcome, PolicyOutcome::Matched { .. }) {
            info!(
                event = "Request",
                phase = "Decision",
                allow = false,
                policy = policy.name(),
                "request forbidden"
            );
            return Decision {
                allow: false,
                reason: format!("forbidden by {}", policy.name()),
                policy: Some(policy.name().to_string()),
                diagnostics,
                version: snapshot.version().clone(),
            };
        }
    }

    let permits = snapshot
        .policies()
        .iter()
        .filter(|p| p.effect() == Effect::Permit);
    for policy in permits {
        let outcome = policy_outcome(policy, request);
        record(policy, &outcome);
        if matches!(outcome, PolicyOutcome::Matched { .. }) {
            info!(
                event = "Request",
                phase = "Decision",
                allow = true,
                policy = policy.name(),
                "request permitted"
            );
            return Decision {
                allow: true,
                reason: policy.name().to_string(),
                policy: Some(policy.name().to_string()),
                diagnostics,
                version: snapshot.version().clone(),
            };
        }
    }

    debug!(
        event = "Request",
        phase = "Decision",
        allow = false,
        reason = NO_MATCHING_POLICY
    );
    Decision {
        allow: false,
        reason: NO_MATCHING_POLICY.to_string(),
        policy: None,
        diagnostics,
        version: snapshot.version().clone(),
    }
}

/// Examine one policy: scope slots in order, then `when`, then `unless`.
fn policy_outcome(policy: &Policy, request: &Request) -> PolicyOutcome {
    let mut reasons = Vec::with_capacity(SLOTS.len());
    for slot in SLOTS {
        let entity = request_entity(request, slot);
        match scope_match_reason(slot, policy.scope(slot), entity) {
            Some(reason) => reasons.push(reason),
            None => return PolicyOutcome::ScopeMismatch { slot },
        }
    }

    if let Some(failed) = policy.when().iter().find(|c| !condition_holds(c, request)) {
        return PolicyOutcome::WhenFailed {
            condition: failed.to_string(),
        };
    }
    if let Some(triggered) = policy.unless().iter().find(|c| condition_holds(c, request)) {
        return PolicyOutcome::UnlessTriggered {
            condition: triggered.to_string(),
        };
    }

    debug!(
        event = "Request",
        phase = "Match",
        policy = policy.name(),
        reasons = ?reasons
    );
    PolicyOutcome::Matched { reasons }
}

fn request_entity(request: &Request, slot: ScopeSlot) -> &EntityRef {
    match slot {
        ScopeSlot::Principal => &request.principal,
        ScopeSlot::Action => &request.action,
        ScopeSlot::Resource => &request.resource,
    }
}

/// Unresolved attributes make every operator false, `!=` included.
pub(crate) fn condition_holds(condition: &Condition, request: &Request) -> bool {
    let Some(value) = resolve(condition.target(), condition.attribute(), request) else {
        return false;
    };
    match (condition.operator(), condition.value()) {
        (Operator::Equals, literal) => value.matches(literal),
        (Operator::NotEquals, literal) => !value.matches(literal),
        (Operator::In, AttrValue::Set(list)) => value.is_in(list),
        (Operator::In, _) => false,
    }
}

fn resolve<'a>(
    target: ConditionTarget,
    attribute: &str,
    request: &'a Request,
) -> Option<Cow<'a, AttrValue>> {
    let entity = match target {
        ConditionTarget::Context => return request.context.get(attribute).map(Cow::Borrowed),
        ConditionTarget::Principal if attribute == "hasGroup" => {
            return request.context.get(GROUPS_KEY).map(Cow::Borrowed);
        }
        ConditionTarget::Principal => &request.principal,
        ConditionTarget::Action => &request.action,
        ConditionTarget::Resource => &request.resource,
    };
    match attribute {
        "id" => entity.id().map(|id| Cow::Owned(AttrValue::from(id))),
        "type" => Some(Cow::Owned(AttrValue::from(entity.entity_type()))),
        _ => None,
    }
}

/// Whether `target.attribute` names something a request can ever supply.
pub(crate) fn is_recognized(target: ConditionTarget, attribute: &str) -> bool {
    match target {
        ConditionTarget::Context => true,
        ConditionTarget::Principal => matches!(attribute, "hasGroup" | "id" | "type"),
        ConditionTarget::Action | ConditionTarget::Resource => {
            matches!(attribute, "id" | "type")
        }
    }
}
