use crate::types::{EntityRef, PolicyMatchReason, ScopeConstraint, ScopeSlot};

/// `in` degrades to exact equality unless the reference is a type wildcard.
fn in_matches(reference: &EntityRef, entity: &EntityRef) -> bool {
    if reference.is_wildcard() {
        reference.entity_type() == entity.entity_type()
    } else {
        reference == entity
    }
}

/// Match one scope slot, returning why it matched.
pub(crate) fn scope_match_reason(
    slot: ScopeSlot,
    constraint: &ScopeConstraint,
    entity: &EntityRef,
) -> Option<PolicyMatchReason> {
    use PolicyMatchReason::*;

    match constraint {
        ScopeConstraint::Any => Some(match slot {
            ScopeSlot::Principal => PrincipalAny,
            ScopeSlot::Action => ActionAny,
            ScopeSlot::Resource => ResourceAny,
        }),
        ScopeConstraint::Equals(reference) if reference == entity => Some(match slot {
            ScopeSlot::Principal => PrincipalEq,
            ScopeSlot::Action => ActionEq,
            ScopeSlot::Resource => ResourceEq,
        }),
        ScopeConstraint::In(reference) if in_matches(reference, entity) => Some(match slot {
            ScopeSlot::Principal => PrincipalIn,
            ScopeSlot::Action => ActionIn,
            ScopeSlot::Resource => ResourceIn,
        }),
        _ => None,
    }
}

/// Whether a principal constraint could apply to `principal` at all, used to
/// list the policies relevant to one principal.
pub(crate) fn principal_could_match(constraint: &ScopeConstraint, principal: &EntityRef) -> bool {
    scope_match_reason(ScopeSlot::Principal, constraint, principal).is_some()
}
