//! Compiled policies.
//!
//! A [`Policy`] only comes out of the parser and is never mutated afterwards.
//! Its `Display` output is canonical policy text that parses back to an equal
//! value, which is what audit trails and management APIs should show.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

use super::attr_value::AttrValue;
use super::entity_ref::{EntityRef, quote};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Effect {
    Permit,
    Forbid,
}

/// The three request slots a policy scope constrains.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScopeSlot {
    Principal,
    Action,
    Resource,
}

/// How one scope slot is constrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(tag = "op", content = "entity")]
pub enum ScopeConstraint {
    /// Bare `principal`: matches everything.
    #[serde(rename = "any")]
    Any,
    /// `principal == User::"alice"`: exact type and id.
    #[serde(rename = "==")]
    Equals(EntityRef),
    /// `resource in Document::*`: every entity of the type, or exact match for
    /// a concrete reference.
    #[serde(rename = "in")]
    In(EntityRef),
}

impl ScopeConstraint {
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            ScopeConstraint::Any => None,
            ScopeConstraint::Equals(r) | ScopeConstraint::In(r) => Some(r),
        }
    }

    /// Render as the scope clause for `slot`, e.g. `action in Action::*`.
    pub fn render(&self, slot: ScopeSlot) -> String {
        match self {
            ScopeConstraint::Any => slot.to_string(),
            ScopeConstraint::Equals(r) => format!("{slot} == {r}"),
            ScopeConstraint::In(r) => format!("{slot} in {r}"),
        }
    }
}

/// Which part of the request a condition inspects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, StrumDisplay, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConditionTarget {
    Principal,
    Action,
    Resource,
    Context,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, StrumDisplay, EnumString,
)]
pub enum Operator {
    #[serde(rename = "==")]
    #[strum(serialize = "==")]
    Equals,
    #[serde(rename = "!=")]
    #[strum(serialize = "!=")]
    NotEquals,
    #[serde(rename = "in")]
    #[strum(serialize = "in")]
    In,
}

/// An attribute test such as `principal.hasGroup == "employees"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct Condition {
    pub(crate) target: ConditionTarget,
    pub(crate) attribute: String,
    pub(crate) operator: Operator,
    pub(crate) value: AttrValue,
}

impl Condition {
    pub fn target(&self) -> ConditionTarget {
        self.target
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &AttrValue {
        &self.value
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}.{} {} {}",
            self.target, self.attribute, self.operator, self.value
        )
    }
}

/// A parsed policy: effect, three scope constraints and attribute conditions.
///
/// All `when` conditions must hold and every `unless` condition must fail for
/// the policy to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Policy {
    pub(crate) name: String,
    pub(crate) effect: Effect,
    pub(crate) principal: ScopeConstraint,
    pub(crate) action: ScopeConstraint,
    pub(crate) resource: ScopeConstraint,
    pub(crate) when: Vec<Condition>,
    pub(crate) unless: Vec<Condition>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) annotations: BTreeMap<String, String>,
}

impl Policy {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn principal(&self) -> &ScopeConstraint {
        &self.principal
    }

    pub fn action(&self) -> &ScopeConstraint {
        &self.action
    }

    pub fn resource(&self) -> &ScopeConstraint {
        &self.resource
    }

    pub fn scope(&self, slot: ScopeSlot) -> &ScopeConstraint {
        match slot {
            ScopeSlot::Principal => &self.principal,
            ScopeSlot::Action => &self.action,
            ScopeSlot::Resource => &self.resource,
        }
    }

    pub fn when(&self) -> &[Condition] {
        &self.when
    }

    pub fn unless(&self) -> &[Condition] {
        &self.unless
    }

    pub fn condition_count(&self) -> usize {
        self.when.len() + self.unless.len()
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

fn render_name(name: &str) -> String {
    if crate::parser::lexer::is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn render_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" && ")
}

impl Display for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "policy {} {{", render_name(&self.name))?;
        for (key, value) in &self.annotations {
            writeln!(f, "    @{key}({})", quote(value))?;
        }
        writeln!(f, "    {}(", self.effect)?;
        writeln!(f, "        {},", self.principal.render(ScopeSlot::Principal))?;
        writeln!(f, "        {},", self.action.render(ScopeSlot::Action))?;
        writeln!(f, "        {}", self.resource.render(ScopeSlot::Resource))?;
        write!(f, "    )")?;
        if !self.when.is_empty() {
            write!(f, " when {{ {} }}", render_conditions(&self.when))?;
        }
        if !self.unless.is_empty() {
            write!(f, " unless {{ {} }}", render_conditions(&self.unless))?;
        }
        writeln!(f, ";")?;
        write!(f, "}}")
    }
}
