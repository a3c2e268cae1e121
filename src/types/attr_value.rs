//! Attribute values carried in request context and policy literals.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::PolicyError;

use super::entity_ref::quote;

/// Values that can appear in a request context or on the right-hand side of a
/// policy condition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "value")]
pub enum AttrValue {
    String(String),
    Bool(bool),
    Long(i64),
    #[schema(no_recursion)]
    Set(Vec<AttrValue>), // typically Set<String>, e.g. group memberships
}

impl AttrValue {
    /// Membership for sets, equality otherwise.
    ///
    /// A set compared against a set literal is equal only when both hold the
    /// same elements in the same order.
    pub(crate) fn matches(&self, literal: &AttrValue) -> bool {
        match (self, literal) {
            (AttrValue::Set(_), AttrValue::Set(_)) => self == literal,
            (AttrValue::Set(items), scalar) => items.contains(scalar),
            (value, literal) => value == literal,
        }
    }

    /// `value in [..]`: a scalar must be one of the listed items, a set must
    /// share at least one item with the list.
    pub(crate) fn is_in(&self, list: &[AttrValue]) -> bool {
        match self {
            AttrValue::Set(items) => items.iter().any(|item| list.contains(item)),
            scalar => list.contains(scalar),
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AttrValue::String(s) => write!(f, "{}", quote(s)),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Long(n) => write!(f, "{n}"),
            AttrValue::Set(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Long(v)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(v: Vec<T>) -> Self {
        AttrValue::Set(v.into_iter().map(Into::into).collect())
    }
}

/// Convert plain JSON (e.g. decoded token claims) into an attribute value.
///
/// Objects, nulls and non-integral numbers have no attribute form.
impl TryFrom<Value> for AttrValue {
    type Error = PolicyError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(AttrValue::String(s)),
            Value::Bool(b) => Ok(AttrValue::Bool(b)),
            Value::Number(n) => n.as_i64().map(AttrValue::Long).ok_or_else(|| {
                PolicyError::InvalidFormat(format!("number {n} is not a 64-bit integer"))
            }),
            Value::Array(items) => items
                .into_iter()
                .map(AttrValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(AttrValue::Set),
            other => Err(PolicyError::InvalidFormat(format!(
                "unsupported attribute value: {other}"
            ))),
        }
    }
}
