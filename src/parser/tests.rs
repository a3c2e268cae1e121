use super::*;
use yare::parameterized;

fn entity(text: &str) -> EntityRef {
    text.parse().unwrap()
}

#[test]
fn test_parse_wrapped_policy_with_when() {
    let policy = parse(
        r#"
        policy EmployeeDocumentAccess {
            permit(
                principal in User::"employee",
                action in Action::"read",
                resource in Document::"hr"
            ) when {
                principal.hasGroup == "employees"
            };
        }
        "#,
    )
    .unwrap();

    assert_eq!(policy.name(), "EmployeeDocumentAccess");
    assert_eq!(policy.effect(), Effect::Permit);
    assert_eq!(
        policy.principal(),
        &ScopeConstraint::In(entity(r#"User::"employee""#))
    );
    assert_eq!(
        policy.action(),
        &ScopeConstraint::In(entity(r#"Action::"read""#))
    );
    assert_eq!(
        policy.resource(),
        &ScopeConstraint::In(entity(r#"Document::"hr""#))
    );
    assert_eq!(policy.when().len(), 1);
    let condition = &policy.when()[0];
    assert_eq!(condition.target(), ConditionTarget::Principal);
    assert_eq!(condition.attribute(), "hasGroup");
    assert_eq!(condition.operator(), Operator::Equals);
    assert_eq!(condition.value(), &AttrValue::from("employees"));
    assert!(policy.unless().is_empty());
}

#[test]
fn test_parse_bare_forbid_with_wildcards_and_any() {
    let policy = parse(r#"forbid(principal, action == Action::"delete", resource in Document::*)"#)
        .unwrap();
    assert_eq!(policy.name(), "policy_1");
    assert_eq!(policy.effect(), Effect::Forbid);
    assert_eq!(policy.principal(), &ScopeConstraint::Any);
    assert_eq!(
        policy.action(),
        &ScopeConstraint::Equals(entity(r#"Action::"delete""#))
    );
    assert_eq!(
        policy.resource(),
        &ScopeConstraint::In(EntityRef::wildcard("Document").unwrap())
    );
}

#[test]
fn test_parse_nth_names_by_batch_position() {
    let policy = parse_nth("permit(principal, action, resource);", 4).unwrap();
    assert_eq!(policy.name(), "policy_4");
}

#[test]
fn test_parse_id_annotation_names_policy() {
    let policy = parse(
        r#"@id("read-only") @advice("audit me") permit(principal, action == Action::"read", resource);"#,
    )
    .unwrap();
    assert_eq!(policy.name(), "read-only");
    assert_eq!(policy.annotation("advice"), Some("audit me"));
    assert_eq!(policy.annotations().len(), 2);
}

#[test]
fn test_parse_wrapper_name_wins_over_id_annotation() {
    let policy = parse(r#"@id("ignored") policy Chosen { permit(principal, action, resource) }"#)
        .unwrap();
    assert_eq!(policy.name(), "Chosen");
    assert_eq!(policy.annotation("id"), Some("ignored"));
}

#[test]
fn test_parse_namespaced_entity_types() {
    let policy =
        parse(r#"permit(principal == Billing::User::"carol", action, resource in Database::Table::*);"#)
            .unwrap();
    let principal = policy.principal().entity().unwrap();
    assert_eq!(principal.entity_type(), "Billing::User");
    assert_eq!(principal.id(), Some("carol"));
    assert_eq!(
        policy.resource().entity().unwrap().entity_type(),
        "Database::Table"
    );
}

#[test]
fn test_parse_multiple_conditions_and_blocks() {
    let policy = parse(
        r#"
        permit(principal, action, resource)
        when { principal.hasGroup == "employees" && context.region in ["eu", "us"] }
        when { context.mfa == true }
        unless { context.risk != 0 context.blocked == true };
        "#,
    )
    .unwrap();
    assert_eq!(policy.when().len(), 3);
    assert_eq!(policy.unless().len(), 2);
    assert_eq!(policy.condition_count(), 5);
    assert_eq!(
        policy.when()[1].value(),
        &AttrValue::Set(vec!["eu".into(), "us".into()])
    );
    assert_eq!(policy.unless()[0].operator(), Operator::NotEquals);
    assert_eq!(policy.unless()[0].value(), &AttrValue::Long(0));
}

#[test]
fn test_parse_document_numbers_policies_in_order() {
    let policies = parse_document(
        r#"
        // first
        permit(principal == User::"alice", action, resource);
        policy Named {
            forbid(principal, action, resource);
        }
        permit(principal, action == Action::"read", resource)
        "#,
    )
    .unwrap();
    let names: Vec<&str> = policies.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["policy_1", "Named", "policy_3"]);
}

#[test]
fn test_parse_document_empty_is_empty() {
    assert!(parse_document("").unwrap().is_empty());
    assert!(parse_document("  // only a comment\n").unwrap().is_empty());
}

#[test]
fn test_parse_document_requires_separator() {
    let err = parse_document(
        "permit(principal, action, resource)\nforbid(principal, action, resource);",
    )
    .unwrap_err();
    assert_eq!(err.message, "expected `;` after the policy, found `forbid`");
    assert_eq!((err.line, err.column), (2, 1));
}

#[test]
fn test_parse_error_keeps_text_and_position() {
    let text = "permit(\n    principal == User::\"alice\"\n    action,\n    resource\n);";
    let err = parse(text).unwrap_err();
    assert_eq!(err.text, text);
    assert_eq!(err.message, "expected `,` after the principal scope, found `action`");
    assert_eq!((err.line, err.column), (3, 5));
}

#[parameterized(
    empty = { "", "empty policy text" },
    missing_effect = { "allow(principal, action, resource);", "expected `permit` or `forbid`, found `allow`" },
    wrong_scope_order = { "permit(action, principal, resource);", "expected `principal`, found `action`" },
    unresolvable_scope = { r#"permit(principal is User, action, resource);"#, "expected `,` after the principal scope, found `is`" },
    bare_entity_id = { "permit(principal == User::alice, action, resource);", "expected `::` in entity reference, found `,`" },
    missing_entity_id = { "permit(principal == User, action, resource);", "expected `::` in entity reference, found `,`" },
    unclosed_paren = { "permit(principal, action, resource", "expected `)` after the resource scope, found end of input" },
    unclosed_wrapper = { "policy P { permit(principal, action, resource);", "expected `}` closing the policy block, found end of input" },
    wrapper_without_name = { "policy { permit(principal, action, resource) }", "expected a policy name, found `{`" },
    unclosed_when = { r#"permit(principal, action, resource) when { context.a == "b""#, "expected `&&`, another condition or `}`, found end of input" },
    empty_when = { "permit(principal, action, resource) when { };", "expected a condition such as" },
    unknown_target = { r#"permit(principal, action, resource) when { user.group == "x" };"#, "unknown condition target `user`" },
    missing_operator = { r#"permit(principal, action, resource) when { context.a "b" };"#, "expected `==`, `!=` or `in`" },
    in_needs_list = { r#"permit(principal, action, resource) when { context.a in "b" };"#, "`in` expects a list literal" },
    bad_literal = { "permit(principal, action, resource) when { context.a == other };", "expected a string, number, boolean or list literal" },
    trailing_input = { "permit(principal, action, resource); permit(principal, action, resource);", "expected end of policy (one policy per text), found `permit`" },
    empty_id_annotation = { r#"@id("") permit(principal, action, resource);"#, "`@id` must not be empty" },
    duplicate_annotation = { r#"@id("a") @id("b") permit(principal, action, resource);"#, "duplicate annotation `@id`" },
    lexer_error = { "permit(principal, action, resource) when { context.a = 1 };", "use `==` for comparison" },
)]
fn test_parse_rejects(text: &str, expected: &str) {
    let err = parse(text).unwrap_err();
    assert!(
        err.message.contains(expected),
        "message {:?} does not contain {:?}",
        err.message,
        expected
    );
    assert_eq!(err.text, text);
}

#[test]
fn test_parse_rejects_deeply_nested_lists() {
    let depth = 100_000;
    let text = format!(
        "permit(principal, action, resource) when {{ context.x == {}{} }};",
        "[".repeat(depth),
        "]".repeat(depth)
    );
    let err = parse(&text).unwrap_err();
    assert_eq!(err.message, "list literals nest too deeply");
    assert_eq!(err.line, 1);

    let report = crate::PolicyEngine::new().load([text.as_str(), "permit(principal, action, resource);"]);
    assert_eq!(report.loaded_count(), 1);
    assert_eq!(report.skipped[0].index, 1);
}

#[test]
fn test_parse_accepts_nested_lists_within_limit() {
    let text = format!(
        "permit(principal, action, resource) when {{ context.x in [{}1{}] }};",
        "[".repeat(MAX_LIST_DEPTH - 1),
        "]".repeat(MAX_LIST_DEPTH - 1)
    );
    assert!(parse(&text).is_ok());

    let too_deep = format!(
        "permit(principal, action, resource) when {{ context.x in [{}1{}] }};",
        "[".repeat(MAX_LIST_DEPTH),
        "]".repeat(MAX_LIST_DEPTH)
    );
    assert!(parse(&too_deep).is_err());
}

#[test]
fn test_parse_entity_ref_standalone() {
    assert_eq!(
        parse_entity_ref("Action::*").unwrap(),
        EntityRef::wildcard("Action").unwrap()
    );
    assert!(parse_entity_ref("Action::* trailing").is_err());
}
