use crate::error::PolicyError;
use crate::types::EntityRef;

/// Anything that can stand in a request slot as an entity, e.g. `User::"alice"`,
/// `Action::"read"` or `Billing::User::"carol"`.
pub trait EntityAtom {
    /// The bare entity type name ("User", "Action", ...).
    fn base_type() -> &'static str;

    /// Namespace segments prefixed to the type, empty by default.
    fn namespace(&self) -> &[String] {
        &[]
    }

    /// The id, unquoted.
    fn entity_id(&self) -> &str;

    /// The fully qualified type, e.g. `Billing::User`.
    fn entity_type(&self) -> String {
        let mut parts: Vec<&str> = self.namespace().iter().map(String::as_str).collect();
        parts.push(Self::base_type());
        parts.join("::")
    }

    /// Build the entity reference used in an authorization request.
    fn entity_ref(&self) -> Result<EntityRef, PolicyError> {
        EntityRef::new(self.entity_type(), self.entity_id())
    }
}
