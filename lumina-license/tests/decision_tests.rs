use lumina_license::{Decision, DenyReason};
use lumina_types::Role;

#[test]
fn roles_granted() {
    assert_eq!(Decision::Allow.role(), Some(Role::Cashier));
    assert_eq!(Decision::AllowAdmin.role(), Some(Role::Admin));
    assert_eq!(Decision::Deny(DenyReason::NotFound).role(), None);
}

#[test]
fn deny_reason_accessor() {
    assert_eq!(
        Decision::Deny(DenyReason::DeviceMismatch).deny_reason(),
        Some(DenyReason::DeviceMismatch)
    );
    assert_eq!(Decision::Allow.deny_reason(), None);
    assert!(!Decision::Deny(DenyReason::Inactive).is_allowed());
}

#[test]
fn every_reason_has_a_distinct_message() {
    let reasons = [
        DenyReason::NotFound,
        DenyReason::Inactive,
        DenyReason::Expired,
        DenyReason::DeviceMismatch,
    ];
    let messages: std::collections::HashSet<_> = reasons.iter().map(|r| r.message()).collect();
    assert_eq!(messages.len(), reasons.len());
    assert_eq!(DenyReason::Expired.to_string(), DenyReason::Expired.message());
}

#[test]
fn decision_wire_shape() {
    let json = serde_json::to_string(&Decision::Deny(DenyReason::DeviceMismatch)).unwrap();
    assert_eq!(json, r#"{"decision":"deny","reason":"device_mismatch"}"#);
    let allow = serde_json::to_string(&Decision::Allow).unwrap();
    assert_eq!(allow, r#"{"decision":"allow"}"#);
    let parsed: Decision = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, Decision::Deny(DenyReason::DeviceMismatch));
}
