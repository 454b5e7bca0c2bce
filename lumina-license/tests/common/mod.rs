//! Shared test helpers for admission tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use ed25519_dalek::SigningKey;
use lumina_crypto::KdfParams;
use lumina_license::{OverrideClaims, sign_override_token};
use lumina_store::{
    AdminCredential, AdminCredentialStore, BindOutcome, KeyDuration, KeyRecordStore, LicenseKey,
    SqliteStore, StoreError, StoreResult,
};
use lumina_types::{DeviceId, KeyId};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed evaluation instant so expiry checks are deterministic.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

pub fn device(name: &str) -> DeviceId {
    DeviceId::new(name).unwrap()
}

/// Fast Argon2 parameters for tests.
pub fn test_params() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

/// An active, unbound key expiring at `valid_until`.
pub fn key_valid_until(key: &str, valid_until: DateTime<Utc>) -> LicenseKey {
    let mut record = LicenseKey::new(key, KeyDuration::Weekly, 25_000, valid_until - Duration::days(7));
    record.valid_until = valid_until;
    record
}

/// An active, unbound key valid for another week.
pub fn live_key(key: &str) -> LicenseKey {
    key_valid_until(key, now() + Duration::days(7))
}

/// A store seeded with `records`.
pub fn store_with(records: &[LicenseKey]) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    for record in records {
        store.insert(record).unwrap();
    }
    store
}

pub fn fetch(store: &SqliteStore, key: &str) -> LicenseKey {
    store.find_by_key(key).unwrap().unwrap()
}

// ── Override keys ────────────────────────────────────────────────

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, [u8; 32]) {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key.to_bytes())
}

/// A second, unrelated key pair.
pub fn other_keypair() -> (SigningKey, [u8; 32]) {
    let signing_key = SigningKey::from_bytes(&[42u8; 32]);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key.to_bytes())
}

/// A token admitting `dev` for one day starting at [`now`].
pub fn override_token(signing_key: &SigningKey, dev: &str) -> String {
    let claims = OverrideClaims::new(device(dev), now(), Duration::days(1));
    sign_override_token(signing_key, &claims).unwrap()
}

// ── Fault-injecting stores ───────────────────────────────────────

/// Every call fails as if the store timed out.
pub struct UnavailableStore;

fn unavailable<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("timed out".to_string()))
}

impl KeyRecordStore for UnavailableStore {
    fn find_by_key(&self, _key: &str) -> StoreResult<Option<LicenseKey>> {
        unavailable()
    }

    fn try_bind_and_increment(
        &self,
        _id: &KeyId,
        _device: &DeviceId,
        _expected: Option<&DeviceId>,
    ) -> StoreResult<BindOutcome> {
        unavailable()
    }

    fn increment_usage(&self, _id: &KeyId) -> StoreResult<()> {
        unavailable()
    }

    fn insert(&self, _record: &LicenseKey) -> StoreResult<()> {
        unavailable()
    }

    fn list(&self) -> StoreResult<Vec<LicenseKey>> {
        unavailable()
    }
}

impl AdminCredentialStore for UnavailableStore {
    fn load_admin(&self) -> StoreResult<Option<AdminCredential>> {
        unavailable()
    }

    fn create_admin_if_absent(&self, _credential: &AdminCredential) -> StoreResult<bool> {
        unavailable()
    }
}

/// Delegates to an inner store, with optional injected behaviour:
/// failing usage increments, a bind that is won by the same device
/// just before ours lands, or failing bind writes. Counts every call.
pub struct ScriptedStore {
    pub inner: SqliteStore,
    pub fail_increment: bool,
    pub same_device_wins_bind: bool,
    pub fail_bind: bool,
    pub calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_increment: false,
            same_device_wins_bind: false,
            fail_bind: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl KeyRecordStore for ScriptedStore {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseKey>> {
        self.touch();
        self.inner.find_by_key(key)
    }

    fn try_bind_and_increment(
        &self,
        id: &KeyId,
        device: &DeviceId,
        expected: Option<&DeviceId>,
    ) -> StoreResult<BindOutcome> {
        self.touch();
        if self.fail_bind {
            return unavailable();
        }
        if self.same_device_wins_bind {
            self.inner.try_bind_and_increment(id, device, expected)?;
            return Ok(BindOutcome::Conflict);
        }
        self.inner.try_bind_and_increment(id, device, expected)
    }

    fn increment_usage(&self, id: &KeyId) -> StoreResult<()> {
        self.touch();
        if self.fail_increment {
            return unavailable();
        }
        self.inner.increment_usage(id)
    }

    fn insert(&self, record: &LicenseKey) -> StoreResult<()> {
        self.touch();
        self.inner.insert(record)
    }

    fn list(&self) -> StoreResult<Vec<LicenseKey>> {
        self.touch();
        self.inner.list()
    }
}
