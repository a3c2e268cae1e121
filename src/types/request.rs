//! Authorization request type.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::PolicyError;
use crate::traits::EntityAtom;

use super::action::Action;
use super::entity_ref::EntityRef;
use super::request_context::RequestContext;
use super::user::User;

/// One authorization question: may `principal` perform `action` on `resource`,
/// given `context`?
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct Request {
    pub principal: EntityRef,
    pub action: EntityRef,
    pub resource: EntityRef,
    #[serde(default)]
    pub context: RequestContext,
}

impl Request {
    /// A request with an empty context.
    pub fn new(principal: EntityRef, action: EntityRef, resource: EntityRef) -> Self {
        Request {
            principal,
            action,
            resource,
            context: RequestContext::new(),
        }
    }

    /// Replace the context and return the updated request.
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Build a request for an authenticated user.
    ///
    /// The user's groups are placed in `context.groups`.
    pub fn for_user(user: &User, action: &Action, resource: EntityRef) -> Result<Self, PolicyError> {
        Ok(Request::new(user.entity_ref()?, action.entity_ref()?, resource)
            .with_context(RequestContext::new().with_groups(user.groups().iter().cloned())))
    }
}
