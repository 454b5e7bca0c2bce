//! Persisted document shapes.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use lumina_types::{DeviceId, KeyId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tariff class a key was sold under.
///
/// Only used to compute `valid_until` at issuance; validation looks at
/// `valid_until` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDuration {
    Weekly,
    Monthly,
    Yearly,
}

impl KeyDuration {
    /// Returns the validity period granted by this tariff.
    #[must_use]
    pub fn span(&self) -> Duration {
        match self {
            Self::Weekly => Duration::days(7),
            Self::Monthly => Duration::days(30),
            Self::Yearly => Duration::days(365),
        }
    }

    /// Returns the lowercase stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for KeyDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown key duration: {other}")),
        }
    }
}

/// Canonical form of a key string: surrounding whitespace removed and
/// upper-cased. Stored keys are always canonical and lookups use the same
/// form, as the login form upper-cases typed input.
#[must_use]
pub fn canonical_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One issued license key document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseKey {
    /// Document identifier.
    pub id: KeyId,
    /// The secret string typed at the login form, in [`canonical_key`] form.
    pub key: String,
    /// Last instant at which the key is still accepted.
    pub valid_until: DateTime<Utc>,
    /// Tariff class the key was sold under.
    pub duration: KeyDuration,
    /// Price in the shop's minor currency unit.
    pub price: i64,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
    /// Revocation flag; false means the key is disabled.
    pub is_active: bool,
    /// Successful validations so far (best effort).
    pub usage_count: u64,
    /// Device the key was claimed by on first use.
    pub bound_device_id: Option<DeviceId>,
}

impl LicenseKey {
    /// Builds a fresh, active, unbound key issued at `created_at`.
    ///
    /// The key string is stored in canonical form. Timestamps are truncated to milliseconds, the precision they are
    /// stored with.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        duration: KeyDuration,
        price: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let created_at = created_at.trunc_subsecs(3);
        Self {
            id: KeyId::new(),
            key: canonical_key(&key.into()),
            valid_until: created_at + duration.span(),
            duration,
            price,
            created_at,
            is_active: true,
            usage_count: 0,
            bound_device_id: None,
        }
    }

    /// Returns true if the key expired strictly before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }

    /// Returns true if the key has been claimed by a device.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound_device_id.is_some()
    }

    /// Returns true if the key is claimed by `device`.
    #[must_use]
    pub fn is_bound_to(&self, device: &DeviceId) -> bool {
        self.bound_device_id.as_ref() == Some(device)
    }
}

/// The single administrator account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    /// Argon2id PHC string; never the plaintext password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}
