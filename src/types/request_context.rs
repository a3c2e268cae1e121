//! Request context values consulted by policy conditions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::PolicyError;

use super::AttrValue;

/// Context key holding the principal's group memberships.
pub const GROUPS_KEY: &str = "groups";

/// Typed wrapper for request context attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RequestContext(BTreeMap<String, AttrValue>);

impl RequestContext {
    /// Create an empty request context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one context attribute and return the updated context.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set `groups` to the given memberships.
    pub fn with_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups = groups
            .into_iter()
            .map(|g| AttrValue::String(g.into()))
            .collect();
        self.with_attr(GROUPS_KEY, AttrValue::Set(groups))
    }

    /// Insert one context attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) -> Option<AttrValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Returns true when there are no context attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of context attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over context attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    /// Build a context from a JSON object such as `{"groups": ["employees"]}`.
    pub fn from_json(value: Value) -> Result<Self, PolicyError> {
        let Value::Object(map) = value else {
            return Err(PolicyError::InvalidFormat(
                "request context must be a JSON object".to_string(),
            ));
        };
        map.into_iter()
            .map(|(k, v)| AttrValue::try_from(v).map(|v| (k, v)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl From<BTreeMap<String, AttrValue>> for RequestContext {
    fn from(value: BTreeMap<String, AttrValue>) -> Self {
        Self(value)
    }
}

impl From<RequestContext> for BTreeMap<String, AttrValue> {
    fn from(value: RequestContext) -> Self {
        value.0
    }
}

impl<'a> IntoIterator for &'a RequestContext {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
