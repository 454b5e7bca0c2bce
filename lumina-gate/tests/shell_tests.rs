use chrono::{TimeZone, Utc};
use lumina_gate::{SHELL_FILE, ShellState, ShellStore};
use lumina_license::{Session, SessionIssuer};
use lumina_types::Role;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn cashier() -> Session {
    SessionIssuer::issue_at(Role::Cashier, Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap())
}

fn admin() -> Session {
    SessionIssuer::issue_at(Role::Admin, Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap())
}

// ── State transitions ────────────────────────────────────────────

#[test]
fn key_login_with_remember_keeps_trimmed_key() {
    let mut state = ShellState::default();
    state.key_login(cashier(), "  KSR-BBBB-2222 ", true);

    assert_eq!(state.session, Some(cashier()));
    assert_eq!(state.remembered_key.as_deref(), Some("KSR-BBBB-2222"));
}

#[test]
fn key_login_without_remember_forgets_previous_key() {
    let mut state = ShellState {
        session: None,
        remembered_key: Some("KSR-OLD0-0000".to_string()),
    };
    state.key_login(cashier(), "KSR-BBBB-2222", false);

    assert_eq!(state.remembered_key, None);
}

#[test]
fn credential_login_leaves_remembered_key() {
    let mut state = ShellState {
        session: None,
        remembered_key: Some("KSR-BBBB-2222".to_string()),
    };
    state.credential_login(admin());

    assert!(state.is_admin());
    assert_eq!(state.remembered_key.as_deref(), Some("KSR-BBBB-2222"));
}

#[test]
fn logout_clears_session_only() {
    let mut state = ShellState::default();
    state.key_login(cashier(), "KSR-BBBB-2222", true);

    assert!(state.logout());
    assert_eq!(state.session, None);
    assert_eq!(state.remembered_key.as_deref(), Some("KSR-BBBB-2222"));
    assert!(!state.logout());
}

#[test]
fn cashier_is_not_admin() {
    let mut state = ShellState::default();
    assert!(!state.is_admin());
    state.key_login(cashier(), "KSR-BBBB-2222", false);
    assert!(!state.is_admin());
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn missing_file_loads_signed_out() {
    let dir = TempDir::new().unwrap();
    let store = ShellStore::in_dir(dir.path());
    assert_eq!(store.load().unwrap(), ShellState::default());
}

#[test]
fn save_then_load_restores_state() {
    let dir = TempDir::new().unwrap();
    let store = ShellStore::in_dir(dir.path().join("nested"));
    let mut state = ShellState::default();
    state.key_login(admin(), "KSR-BBBB-2222", true);

    store.save(&state).unwrap();

    assert_eq!(store.path(), dir.path().join("nested").join(SHELL_FILE));
    assert_eq!(store.load().unwrap(), state);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(SHELL_FILE), "garbage").unwrap();

    assert!(ShellStore::in_dir(dir.path()).load().is_err());
}

#[test]
fn saved_file_uses_lowercase_roles() {
    let dir = TempDir::new().unwrap();
    let store = ShellStore::in_dir(dir.path());
    let mut state = ShellState::default();
    state.credential_login(admin());
    store.save(&state).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"admin\""));
    assert!(!dir.path().join("shell.json.tmp").exists());
}
