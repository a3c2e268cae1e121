use std::sync::Arc;

use super::*;
use crate::snapshot_decision;
use crate::types::{Action, Effect, PolicyOutcome, RequestContext, User};
use sha2::{Digest, Sha256};
use yare::parameterized;

mod reload;

const SCENARIO_A: &str = r#"
permit (
    principal in User::"alice",
    action == Action::"read",
    resource in Document::"public"
);
"#;

const SCENARIO_B: &str = r#"
permit (
    principal in User::"admin",
    action in Action::*,
    resource in Document::*
);
"#;

const SCENARIO_C: &str = r#"
policy EmployeeDocumentAccess {
    permit (
        principal in User::"employee",
        action == Action::"read",
        resource in Document::"hr"
    ) when {
        principal.hasGroup == "employees"
    };
}
"#;

const SCENARIO_D: &str = r#"
@id("BobNoDelete")
forbid (
    principal in User::"bob",
    action == Action::"delete",
    resource in Document::*
);

@id("BobEverything")
permit (
    principal in User::"bob",
    action in Action::*,
    resource in Document::*
);
"#;

const TEST_POLICY: &str = r#"
@id("AliceViewsPhotos")
permit (
    principal == User::"alice",
    action in Action::*,
    resource == Photo::"VacationPhoto94.jpg"
);

@id("BobViewsPhotos")
permit (
    principal == User::"bob",
    action == Action::"view",
    resource == Photo::"VacationPhoto94.jpg"
);
"#;

const TEST_POLICY_WITHOUT_BOB: &str = r#"
@id("AliceViewsPhotos")
permit (
    principal == User::"alice",
    action in Action::*,
    resource == Photo::"VacationPhoto94.jpg"
);
"#;

const TEST_POLICY_WITH_FORBID: &str = r#"
permit (
    principal == User::"alice",
    action in Action::*,
    resource == Photo::"VacationPhoto94.jpg"
);
forbid (
    principal == User::"alice",
    action == Action::"edit",
    resource == Photo::"VacationPhoto94.jpg"
);
forbid (
    principal,
    action == Action::"delete",
    resource == Photo::"VacationPhoto94.jpg"
);
"#;

const TEST_POLICY_WITH_CONTEXT: &str = r#"
policy RegionalHosts {
    permit (
        principal in User::*,
        action == Action::"create_host",
        resource in Host::*
    ) when {
        context.region in ["eu-north", "eu-west"] &&
        principal.hasGroup == "ops"
    } unless {
        context.freeze == true
    };
}
"#;

const TEST_PERMISSION_POLICY: &str = r#"
permit (
    principal == User::"alice",
    action == Action::"view",
    resource == Photo::"VacationPhoto94.jpg"
);

permit (
    principal == User::"alice",
    action == Action::"create_host",
    resource in Host::*
);

permit (
    principal in User::*,
    action == Action::"list",
    resource
);

permit (
    principal == User::"bob",
    action == Action::"view",
    resource == Photo::"VacationPhoto94.jpg"
);

permit (
    principal,
    action,
    resource == Photo::"public.jpg"
);
"#;

const TEST_POLICY_WITH_NAMESPACES: &str = r#"
permit (
    principal == Database::User::"alice",
    action == Database::Action::"create_table",
    resource in Database::Table::*
);

permit (
    principal in Database::User::*,
    action == Database::Action::"view_table",
    resource in Database::Table::*
) when {
    principal.hasGroup == "dbusers"
};
"#;

#[derive(Clone, Default)]
struct SharedLogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

struct SharedLogWriter(Arc<std::sync::Mutex<Vec<u8>>>);

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(Arc::clone(&self.0))
    }
}

impl std::io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedLogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Run `f` with a thread-local subscriber that writes plain text into a buffer.
fn capture_logs<F: FnOnce()>(f: F) -> String {
    let buffer = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

fn engine_from_policy(policy_text: &str) -> PolicyEngine {
    PolicyEngine::new_from_str(policy_text).expect("policy should load")
}

fn entity(text: &str) -> EntityRef {
    text.parse().expect("valid entity reference")
}

fn user_request(user: &str, action: &str, resource: &str) -> Request {
    Request::for_user(
        &User::new(user, None, None),
        &Action::new(action, None),
        entity(resource),
    )
    .expect("valid request")
}

fn group_request(user: &str, groups: &[&str], action: &str, resource: &str) -> Request {
    let groups = groups.iter().map(|g| g.to_string()).collect();
    Request::for_user(
        &User::new(user, Some(groups), None),
        &Action::new(action, None),
        entity(resource),
    )
    .expect("valid request")
}

fn assert_allow(decision: &Decision) {
    assert!(decision.allow, "expected allow, got {decision}");
}

fn assert_deny(decision: &Decision) {
    assert!(!decision.allow, "expected deny, got {decision}");
}

include!("core.rs");
include!("evaluate.rs");
include!("listing.rs");
