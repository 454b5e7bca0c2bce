mod common;

use chrono::Duration;
use common::{device, now, UnavailableStore};
use lumina_crypto::CODE_ALPHABET;
use lumina_license::{
    AdmissionEngine, Decision, KEY_PREFIX, KeyIssuer, LicenseError, generate_key_code,
    normalize_key,
};
use lumina_store::{KeyDuration, KeyRecordStore, SqliteStore};

#[test]
fn generated_codes_have_expected_shape() {
    let code = generate_key_code();
    let parts: Vec<&str> = code.split('-').collect();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], KEY_PREFIX);
    for part in &parts[1..] {
        assert_eq!(part.len(), 4);
        assert!(part.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }
    assert_eq!(normalize_key(&code), code);
}

#[test]
fn normalize_trims_and_uppercases() {
    assert_eq!(normalize_key("  ksr-abcd-2345 \n"), "KSR-ABCD-2345");
}

#[test]
fn issued_key_is_persisted_active_and_unbound() {
    let store = SqliteStore::open_in_memory().unwrap();
    let issuer = KeyIssuer::new(&store);
    let issued = issuer.issue_at(KeyDuration::Monthly, 150_000, now()).unwrap();

    assert_eq!(issued.valid_until - issued.created_at, Duration::days(30));
    let stored = store.find_by_key(&issued.key).unwrap().unwrap();
    assert_eq!(stored, issued);
    assert!(stored.is_active);
    assert_eq!(stored.usage_count, 0);
    assert!(stored.bound_device_id.is_none());
}

#[test]
fn issued_key_admits_first_device() {
    let store = SqliteStore::open_in_memory().unwrap();
    let issued = KeyIssuer::new(&store)
        .issue_at(KeyDuration::Weekly, 50_000, now())
        .unwrap();
    let engine = AdmissionEngine::new(&store);

    let typed = issued.key.to_lowercase();
    assert_eq!(
        engine.validate_at(&typed, &device("dev-1"), now()).unwrap(),
        Decision::Allow
    );
    assert_eq!(
        engine
            .validate_at(&issued.key, &device("dev-1"), now() + Duration::days(8))
            .unwrap(),
        Decision::Deny(lumina_license::DenyReason::Expired)
    );
}

#[test]
fn issued_keys_are_distinct() {
    let store = SqliteStore::open_in_memory().unwrap();
    let issuer = KeyIssuer::new(&store);
    for _ in 0..20 {
        issuer.issue(KeyDuration::Yearly, 0).unwrap();
    }
    let mut keys: Vec<String> = store.list().unwrap().into_iter().map(|k| k.key).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 20);
}

#[test]
fn issuance_surfaces_store_outage() {
    let err = KeyIssuer::new(UnavailableStore)
        .issue(KeyDuration::Weekly, 0)
        .unwrap_err();
    assert!(matches!(err, LicenseError::StoreUnavailable(_)));
}
