use chrono::{TimeZone, Utc};
use lumina_license::{Decision, DenyReason, Session, SessionIssuer};
use lumina_types::Role;

#[test]
fn issue_stamps_role_and_time() {
    let before = Utc::now();
    let session = SessionIssuer::issue(Role::Cashier);
    assert_eq!(session.role, Role::Cashier);
    assert!(session.issued_at >= before);
    assert!(!session.is_admin());
}

#[test]
fn issue_at_is_pure() {
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(SessionIssuer::issue_at(Role::Admin, at), SessionIssuer::issue_at(Role::Admin, at));
}

#[test]
fn sessions_follow_decisions() {
    assert_eq!(SessionIssuer::for_decision(&Decision::Allow).unwrap().role, Role::Cashier);
    assert_eq!(SessionIssuer::for_decision(&Decision::AllowAdmin).unwrap().role, Role::Admin);
    assert!(SessionIssuer::for_decision(&Decision::Deny(DenyReason::Expired)).is_none());
}

#[test]
fn session_serde() {
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let session = SessionIssuer::issue_at(Role::Admin, at);
    let json = serde_json::to_string(&session).unwrap();
    assert!(json.contains("\"role\":\"admin\""));
    let parsed: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, session);
}
