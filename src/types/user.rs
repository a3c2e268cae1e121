//! Caller-side identities built from validated token claims.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::traits::EntityAtom;

use super::entity_ref::quote;

/// An authenticated user, possibly with a namespace (e.g. `Billing::User::"carol"`).
///
/// Group memberships do not become part of the principal reference; they are
/// carried in the request context under `groups`, where `principal.hasGroup`
/// conditions look for them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct User {
    id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    namespace: Vec<String>,
}

impl User {
    /// Create a new user with optional groups and an optional namespace.
    ///
    /// ## Parameters
    ///
    /// - `id`: The unique identifier for the user, usually the token subject.
    /// - `groups`: The groups the identity provider reports for the user.
    /// - `namespace`: Namespace segments for the `User` type.
    pub fn new<T: Into<String>>(
        id: T,
        groups: Option<Vec<String>>,
        namespace: Option<Vec<String>>,
    ) -> Self {
        User {
            id: id.into(),
            groups: groups.unwrap_or_default(),
            namespace: namespace.unwrap_or_default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }
}

impl EntityAtom for User {
    fn base_type() -> &'static str {
        "User"
    }

    fn namespace(&self) -> &[String] {
        &self.namespace
    }

    fn entity_id(&self) -> &str {
        &self.id
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}::{}", self.entity_type(), quote(&self.id))
    }
}
