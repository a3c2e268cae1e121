//! Action identities used when building requests.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::traits::EntityAtom;

use super::entity_ref::quote;

/// An action, possibly with a namespace (e.g. `Infra::Action::"delete_vm"`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct Action {
    id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    namespace: Vec<String>,
}

impl Action {
    /// Create a new action with an optional namespace.
    pub fn new<T: Into<String>>(id: T, namespace: Option<Vec<String>>) -> Self {
        Action {
            id: id.into(),
            namespace: namespace.unwrap_or_default(),
        }
    }
}

impl EntityAtom for Action {
    fn base_type() -> &'static str {
        "Action"
    }

    fn namespace(&self) -> &[String] {
        &self.namespace
    }

    fn entity_id(&self) -> &str {
        &self.id
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}::{}", self.entity_type(), quote(&self.id))
    }
}

impl From<&str> for Action {
    fn from(v: &str) -> Self {
        Action::new(v, None)
    }
}
