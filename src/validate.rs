//! Authoring-time checks for policy documents.
//!
//! [`validate`] parses a document without installing it and reports parse
//! errors plus warnings for constructs that parse but can never do what the
//! author most likely meant.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseError;
use crate::evaluator::is_recognized;
use crate::parser::parse_document;
use crate::types::{AttrValue, Operator, Policy, PolicySummary, ScopeConstraint, ScopeSlot};

/// Result of validating one policy document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ValidationReport {
    /// The document parsed; warnings do not affect this.
    pub valid: bool,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<String>,
    /// Summaries of the parsed policies, empty when the document is invalid.
    pub policies: Vec<PolicySummary>,
}

/// Parse `text` as a policy document and report problems.
///
/// ```rust
/// let report = sentinela_core::validate(
///     r#"permit(principal, action, resource) when { resource.owner == "alice" };"#,
/// );
/// assert!(report.valid);
/// assert_eq!(report.warnings.len(), 1);
/// ```
pub fn validate(text: &str) -> ValidationReport {
    match parse_document(text) {
        Ok(policies) => ValidationReport {
            valid: true,
            errors: Vec::new(),
            warnings: warnings(&policies),
            policies: policies.iter().map(PolicySummary::from).collect(),
        },
        Err(error) => ValidationReport {
            valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            policies: Vec::new(),
        },
    }
}

fn warnings(policies: &[Policy]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for policy in policies {
        let name = policy.name();
        if !seen.insert(name) {
            warnings.push(format!("duplicate policy name `{name}`"));
        }

        for slot in [ScopeSlot::Principal, ScopeSlot::Action, ScopeSlot::Resource] {
            if let ScopeConstraint::Equals(reference) = policy.scope(slot)
                && reference.is_wildcard()
            {
                warnings.push(format!(
                    "policy `{name}`: `{slot} == {reference}` only matches wildcard requests; \
                     use `{slot} in {reference}` to match every {}",
                    reference.entity_type()
                ));
            }
        }

        for condition in policy.when().iter().chain(policy.unless()) {
            if !is_recognized(condition.target(), condition.attribute()) {
                warnings.push(format!(
                    "policy `{name}`: `{}.{}` is never provided by a request, so `{condition}` is always false",
                    condition.target(),
                    condition.attribute()
                ));
            }
            if condition.operator() == Operator::In
                && matches!(condition.value(), AttrValue::Set(items) if items.is_empty())
            {
                warnings.push(format!(
                    "policy `{name}`: `{condition}` tests against an empty list and is always false"
                ));
            }
        }
    }

    warnings
}
