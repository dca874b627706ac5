use super::*;
use crate::types::Value;
use yare::parameterized;

mod concurrency;

const TIERED_POLICY: &str = r#"(role == "pro") or (department == "infosec" and level >= 3)"#;

fn attrs(pairs: &[(&str, Value)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[parameterized(
    role_match = { r#"role == "pro""#, attrs(&[("role", "pro".into())]), true },
    role_mismatch = { r#"role == "pro""#, attrs(&[("role", "basic".into())]), false },
    infosec_senior = {
        r#"department == "infosec" and level >= 3"#,
        attrs(&[("department", "infosec".into()), ("level", 5.into())]),
        true
    },
    infosec_junior = {
        r#"department == "infosec" and level >= 3"#,
        attrs(&[("department", "infosec".into()), ("level", 2.into())]),
        false
    },
    membership = {
        r#""admin" in roles"#,
        attrs(&[("roles", vec!["user", "admin"].into())]),
        true
    },
    empty_allows = { "", attrs(&[("anything", 1.into())]), true },
    type_mismatch_denies = { r#"level >= "not-a-number""#, attrs(&[("level", 3.into())]), false },
)]
fn test_reference_scenarios(expression: &str, attributes: Attributes, expected: bool) {
    assert_eq!(evaluate_policy(expression, &attributes), expected);
}

#[parameterized(
    pro = { attrs(&[("role", "pro".into())]), true },
    infosec_level_three = {
        attrs(&[("role", "basic".into()), ("department", "infosec".into()), ("level", 3.into())]),
        true
    },
    wrong_department = {
        attrs(&[("department", "sales".into()), ("level", 9.into())]),
        false
    },
    nothing_known = { attrs(&[]), false },
)]
fn test_tiered_policy(attributes: Attributes, expected: bool) {
    assert_eq!(evaluate_policy(TIERED_POLICY, &attributes), expected);
}

#[parameterized(
    empty = { "" },
    spaces = { "   " },
    tabs_and_newlines = { "\t\n  \r\n" },
)]
fn test_blank_expression_allows_regardless_of_attributes(expression: &str) {
    assert!(evaluate_policy(expression, &attrs(&[])));
    assert!(evaluate_policy(
        expression,
        &attrs(&[("role", Value::Null), ("banned", true.into())])
    ));
}

#[test]
fn test_caller_attributes_are_not_mutated() {
    let attributes = attrs(&[("role", "pro".into())]);
    let before = attributes.clone();
    assert!(!evaluate_policy("missing_a or missing_b", &attributes));
    assert_eq!(attributes, before);
}

#[test]
fn test_repeated_evaluation_is_deterministic() {
    let attributes = attrs(&[
        ("department", "infosec".into()),
        ("level", 4.into()),
        ("roles", vec!["user"].into()),
    ]);
    let expression = r#"department == "infosec" and level in (3, 4) and "user" in roles"#;
    let first = evaluate_policy(expression, &attributes);
    assert!(first);
    for _ in 0..100 {
        assert_eq!(evaluate_policy(expression, &attributes), first);
    }
}

#[test]
fn test_decide_reports_error_kind() {
    let attributes = attrs(&[("level", 3.into())]);
    assert!(matches!(
        decide("level +", &attributes),
        Err(PolicyError::Grammar(_))
    ));
    assert!(matches!(
        decide("level < 'x'", &attributes),
        Err(PolicyError::Evaluation(_))
    ));
    assert_eq!(decide("level == 3", &attributes), Ok(true));
}
