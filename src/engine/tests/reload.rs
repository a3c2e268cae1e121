use super::*;

#[test]
fn test_reload_policy() {
    let engine = engine_from_policy(TEST_POLICY);
    let request = user_request("bob", "view", r#"Photo::"VacationPhoto94.jpg""#);

    let before_reload = engine.evaluate(&request);
    assert_allow(&before_reload);

    engine.load_from_str(TEST_POLICY_WITHOUT_BOB).unwrap();

    let after_reload = engine.evaluate(&request);
    assert_deny(&after_reload);
}

#[test]
fn test_policy_reload_during_evaluation() {
    use std::thread;
    use std::time::Duration;

    let engine = Arc::new(engine_from_policy(TEST_POLICY));
    let engine_eval = Arc::clone(&engine);
    let engine_reload = Arc::clone(&engine);

    // Every decision must come from either the full old or the full new set.
    let eval_handle = thread::spawn(move || {
        for _ in 0..200 {
            let decision =
                engine_eval.evaluate(&user_request("bob", "view", r#"Photo::"VacationPhoto94.jpg""#));
            let expected_examined = if decision.allow { 2 } else { 1 };
            assert_eq!(decision.diagnostics.len(), expected_examined);
            thread::sleep(Duration::from_micros(10));
        }
    });

    let reload_handle = thread::spawn(move || {
        for i in 0..20 {
            let text = if i % 2 == 0 {
                TEST_POLICY_WITHOUT_BOB
            } else {
                TEST_POLICY
            };
            engine_reload.load_from_str(text).unwrap();
            thread::sleep(Duration::from_millis(1));
        }
    });

    eval_handle.join().unwrap();
    reload_handle.join().unwrap();
    assert_eq!(engine.count(), 2);
}

#[test]
fn test_policy_version_changes_on_reload() {
    let engine = engine_from_policy(TEST_POLICY);
    let first = engine.current_version();

    engine.load_from_str(TEST_POLICY_WITHOUT_BOB).unwrap();
    let second = engine.current_version();
    assert_ne!(first.hash, second.hash);

    // Identical source, identical hash.
    engine.load_from_str(TEST_POLICY).unwrap();
    assert_eq!(engine.current_version().hash, first.hash);
}

#[test]
fn test_snapshot_survives_reload() {
    let engine = engine_from_policy(TEST_POLICY);
    let old = engine.current_snapshot();
    engine.load_from_str(TEST_POLICY_WITHOUT_BOB).unwrap();

    assert_eq!(old.len(), 2);
    assert_eq!(engine.current_snapshot().len(), 1);
    let request = user_request("bob", "view", r#"Photo::"VacationPhoto94.jpg""#);
    assert!(crate::evaluate_snapshot(&old, &request).allow);
    assert!(!engine.evaluate(&request).allow);
}

#[test]
fn test_load_batch_report() {
    let engine = PolicyEngine::new();
    let report = engine.load([
        r#"permit(principal == User::"alice", action, resource);"#,
        r#"permit(principal == User::"bob", action resource);"#,
        r#"@id("NoDeletes") forbid(principal, action == Action::"delete", resource);"#,
    ]);

    assert_eq!(report.loaded, vec!["policy_1", "NoDeletes"]);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped[0].index, 2);
    assert!(report.skipped[0].error.message.contains("after the action scope"));
    assert!(!report.retained_previous);
    assert!(!report.is_clean());
    assert_eq!(report.version, engine.current_version());

    assert_allow(&engine.evaluate(&user_request("alice", "read", r#"Doc::"a""#)));
    assert_deny(&engine.evaluate(&user_request("bob", "read", r#"Doc::"a""#)));
    assert_deny(&engine.evaluate(&user_request("alice", "delete", r#"Doc::"a""#)));
}

#[test]
fn test_load_is_idempotent() {
    let texts = [SCENARIO_A.trim(), SCENARIO_B.trim()];
    let engine = PolicyEngine::new();
    let first = engine.load(texts);
    let second = engine.load(texts);
    assert_eq!(first.version.hash, second.version.hash);
    assert_eq!(first.loaded, second.loaded);

    for (user, action, resource) in [
        ("alice", "read", r#"Document::"public""#),
        ("admin", "write", r#"Document::"x""#),
        ("eve", "read", r#"Document::"public""#),
    ] {
        let request = user_request(user, action, resource);
        let a = engine.evaluate(&request);
        engine.load(texts);
        let b = engine.evaluate(&request);
        assert_eq!((a.allow, a.reason), (b.allow, b.reason));
    }
}

#[test]
fn test_fail_closed_installs_empty_set() {
    let engine = engine_from_policy(SCENARIO_B);
    let report = engine.load(["not a policy"]);
    assert!(!report.retained_previous);
    assert!(report.loaded.is_empty());
    assert_eq!(engine.count(), 0);
    assert_deny(&engine.evaluate(&user_request("admin", "delete", r#"Document::"secret""#)));
}

#[test]
fn test_keep_last_known_good_retains_previous_set() {
    let engine = PolicyEngine::builder()
        .fail_mode(FailMode::KeepLastKnownGood)
        .build();
    engine.load([SCENARIO_B.trim()]);
    let before = engine.current_version();

    let report = engine.load(["not a policy", "permit("]);
    assert!(report.retained_previous);
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(report.version, before);
    assert_eq!(engine.count(), 1);
    assert_allow(&engine.evaluate(&user_request("admin", "delete", r#"Document::"secret""#)));

    let empty: [&str; 0] = [];
    assert!(engine.load(empty).retained_previous);
    assert_eq!(engine.count(), 1);
}

#[test]
fn test_keep_last_known_good_installs_partial_loads() {
    let engine = PolicyEngine::builder()
        .fail_mode(FailMode::KeepLastKnownGood)
        .build();
    engine.load([SCENARIO_B.trim()]);
    let report = engine.load([SCENARIO_A.trim(), "broken"]);
    assert!(!report.retained_previous);
    assert_eq!(report.loaded, vec!["policy_1"]);
    assert_deny(&engine.evaluate(&user_request("admin", "delete", r#"Document::"secret""#)));
}

#[test]
fn test_load_from_str_error_keeps_current_set() {
    let engine = engine_from_policy(SCENARIO_B);
    let before = engine.current_version();
    let err = engine
        .load_from_str("permit(principal, action, resource); forbid(")
        .unwrap_err();
    assert!(matches!(err, PolicyError::Parse(_)));
    assert_eq!(engine.current_version(), before);
    assert_allow(&engine.evaluate(&user_request("admin", "delete", r#"Document::"secret""#)));
}

#[test]
fn test_clear_denies_everything() {
    let engine = engine_from_policy(SCENARIO_B);
    let version = engine.clear();
    assert_eq!(engine.count(), 0);
    assert_eq!(engine.current_version(), version);
    assert_deny(&engine.evaluate(&user_request("admin", "delete", r#"Document::"secret""#)));
}

#[test]
fn test_duplicate_names_are_accepted() {
    let engine = PolicyEngine::new();
    let logs = capture_logs(|| {
        let report = engine.load([
            r#"@id("Same") permit(principal == User::"a", action, resource);"#,
            r#"@id("Same") permit(principal == User::"b", action, resource);"#,
        ]);
        assert_eq!(report.loaded, vec!["Same", "Same"]);
    });
    assert!(logs.contains("duplicate policy name"), "logs: {logs}");
    assert_allow(&engine.evaluate(&user_request("b", "x", r#"Doc::"d""#)));
    // Lookup by name returns the first one.
    assert_eq!(
        engine.policy("Same").unwrap().principal().entity(),
        Some(&entity(r#"User::"a""#))
    );
}
