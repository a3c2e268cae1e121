//! Sentinela core: a small policy language and an in-process authorization
//! engine for it.
//!
//! Policies are parsed into [`Policy`] values and loaded into a
//! [`PolicyEngine`], which decides [`Request`]s with a fixed precedence: any
//! matching `forbid` denies, otherwise the first matching `permit` allows,
//! otherwise the request is denied.
//!
//! ```rust
//! use sentinela_core::{Action, EntityRef, PolicyEngine, Request, User};
//!
//! let engine = PolicyEngine::new_from_str(
//!     r#"
//!     policy EmployeeDocumentAccess {
//!         permit(principal in User::*, action == Action::"read", resource in Document::*)
//!         when { principal.hasGroup == "employees" };
//!     }
//!     "#,
//! )
//! .unwrap();
//!
//! let user = User::new("alice", Some(vec!["employees".into()]), None);
//! let request = Request::for_user(
//!     &user,
//!     &Action::new("read", None),
//!     EntityRef::new("Document", "handbook").unwrap(),
//! )
//! .unwrap();
//!
//! let decision = engine.evaluate(&request);
//! assert!(decision.allow);
//! assert_eq!(decision.reason, "EmployeeDocumentAccess");
//! ```

pub use engine::{FailMode, PolicyEngine, PolicyEngineBuilder, evaluate};
pub use error::{ParseError, PolicyError};
pub use evaluator::{NO_MATCHING_POLICY, evaluate_snapshot};
pub use loader::compile_policies;
pub use parser::{parse, parse_document, parse_nth};
pub use traits::EntityAtom;
pub use types::*;
pub use validate::{ValidationReport, validate};

mod engine;
mod error;
mod evaluator;
mod loader;
pub mod metrics;
mod parser;
mod policy_match;
mod traits;
pub mod types;
mod validate;

#[cfg(test)]
mod tests;
