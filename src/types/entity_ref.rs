//! Entity references: `Type::"id"` or the type wildcard `Type::*`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PolicyError;
use crate::parser::lexer::is_identifier;

/// A `(type, id)` pair naming a principal, action or resource.
///
/// An absent id is a wildcard over the type (`Document::*`). The type is one or
/// more `::`-separated identifiers (`User`, `Database::Table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawEntityRef")]
pub struct EntityRef {
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Deserialize)]
struct RawEntityRef {
    #[serde(rename = "type")]
    entity_type: String,
    #[serde(default)]
    id: Option<String>,
}

impl TryFrom<RawEntityRef> for EntityRef {
    type Error = PolicyError;

    fn try_from(raw: RawEntityRef) -> Result<Self, Self::Error> {
        match raw.id {
            Some(id) => EntityRef::new(raw.entity_type, id),
            None => EntityRef::wildcard(raw.entity_type),
        }
    }
}

impl EntityRef {
    /// A concrete entity, e.g. `User::"alice"`.
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Result<Self, PolicyError> {
        Ok(EntityRef {
            entity_type: checked_type(entity_type.into())?,
            id: Some(id.into()),
        })
    }

    /// Every entity of a type, e.g. `Action::*`.
    pub fn wildcard(entity_type: impl Into<String>) -> Result<Self, PolicyError> {
        Ok(EntityRef {
            entity_type: checked_type(entity_type.into())?,
            id: None,
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_wildcard(&self) -> bool {
        self.id.is_none()
    }
}

fn checked_type(entity_type: String) -> Result<String, PolicyError> {
    if entity_type.trim().is_empty() {
        return Err(PolicyError::EmptyEntityType);
    }
    if !entity_type.split("::").all(is_identifier) {
        return Err(PolicyError::InvalidFormat(format!(
            "invalid entity type '{entity_type}': expected identifiers separated by `::`"
        )));
    }
    Ok(entity_type)
}

/// Quote a string the way policy text expects it.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.id {
            Some(id) => write!(f, "{}::{}", self.entity_type, quote(id)),
            None => write!(f, "{}::*", self.entity_type),
        }
    }
}

impl FromStr for EntityRef {
    type Err = PolicyError;

    /// Accepts the policy-text forms `User::"alice"`, `Database::Table::"users"`
    /// and `Document::*`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_entity_ref(s).map_err(|e| {
            PolicyError::InvalidFormat(format!(
                "failed to parse entity reference '{s}': {} (expected Type::\"id\" or Type::*)",
                e.message
            ))
        })
    }
}
