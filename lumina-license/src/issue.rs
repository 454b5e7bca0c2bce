//! Issuing new license keys.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use lumina_crypto::random_code;
use lumina_store::{KeyDuration, KeyRecordStore, LicenseKey, StoreError, canonical_key};
use tracing::{info, warn};

/// Prefix of every issued key.
pub const KEY_PREFIX: &str = "KSR";

const KEY_GROUPS: usize = 3;
const KEY_GROUP_LEN: usize = 4;
const MAX_ATTEMPTS: usize = 5;

/// Returns a fresh random key string, e.g. `KSR-7KQM-X2PD-9HTA`.
#[must_use]
pub fn generate_key_code() -> String {
    format!("{KEY_PREFIX}-{}", random_code(KEY_GROUPS, KEY_GROUP_LEN))
}

/// Canonical form used for lookup; the same form keys are stored in.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    canonical_key(raw)
}

/// Creates and persists new license keys.
pub struct KeyIssuer<S> {
    store: S,
}

impl<S: KeyRecordStore> KeyIssuer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Issues an active, unbound key valid for `duration` from now.
    pub fn issue(&self, duration: KeyDuration, price: i64) -> LicenseResult<LicenseKey> {
        self.issue_at(duration, price, Utc::now())
    }

    /// Issues a key as of `now`, regenerating on the (unlikely) event of a
    /// key string collision.
    pub fn issue_at(
        &self,
        duration: KeyDuration,
        price: i64,
        now: DateTime<Utc>,
    ) -> LicenseResult<LicenseKey> {
        for _ in 0..MAX_ATTEMPTS {
            let record = LicenseKey::new(generate_key_code(), duration, price, now);
            match self.store.insert(&record) {
                Ok(()) => {
                    info!(
                        "Issued {} license key {} valid until {}",
                        duration, record.id, record.valid_until
                    );
                    return Ok(record);
                }
                Err(StoreError::DuplicateKey) => {
                    warn!("Generated key collided with an existing key, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(LicenseError::Issuance(format!(
            "no unique key after {MAX_ATTEMPTS} attempts"
        )))
    }
}
