//! Shared test helpers for store tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use lumina_store::{KeyDuration, LicenseKey};
use lumina_types::DeviceId;

pub fn device(name: &str) -> DeviceId {
    DeviceId::new(name).unwrap()
}

/// An active, unbound weekly key issued now.
pub fn fresh_key(key: &str) -> LicenseKey {
    LicenseKey::new(key, KeyDuration::Weekly, 25_000, Utc::now())
}

/// An active, unbound key issued long enough ago to have expired.
pub fn expired_key(key: &str) -> LicenseKey {
    LicenseKey::new(key, KeyDuration::Weekly, 25_000, Utc::now() - Duration::days(8))
}
