//! The admission decision for a presented license key.
//!
//! Checks run in a fixed order and stop at the first verdict, so a caller
//! always gets one specific reason:
//!
//! 1. operator override token → `AllowAdmin` (no store access)
//! 2. unknown key → `NotFound`
//! 3. revoked → `Inactive`
//! 4. past `valid_until` → `Expired`
//! 5. unbound → claim with a compare-and-set, then `Allow`
//! 6. bound here → `Allow`
//! 7. bound elsewhere → `DeviceMismatch`
//!
//! Only steps 5 and 6 write. Usage counting is telemetry: a failed
//! increment is logged and never turns into a denial.

use crate::decision::{Decision, DenyReason};
use crate::error::LicenseResult;
use crate::issue::normalize_key;
use crate::override_token::{OverrideToken, override_public_key};
use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use lumina_store::{BindOutcome, KeyRecordStore, LicenseKey};
use lumina_types::{DeviceId, KeyId};
use tracing::{debug, info, warn};

/// Decides whether a device may open a session with a presented key.
pub struct AdmissionEngine<S> {
    store: S,
    override_key: Option<VerifyingKey>,
}

impl<S: KeyRecordStore> AdmissionEngine<S> {
    /// Creates an engine with the operator override disabled.
    pub fn new(store: S) -> Self {
        Self {
            store,
            override_key: None,
        }
    }

    /// Enables the operator override, accepting tokens signed by the
    /// holder of `public_key`.
    pub fn with_override_key(mut self, public_key: &[u8; 32]) -> LicenseResult<Self> {
        self.override_key = Some(override_public_key(public_key)?);
        Ok(self)
    }

    /// Validates `presented_key` for `device` at the current time.
    pub fn validate(&self, presented_key: &str, device: &DeviceId) -> LicenseResult<Decision> {
        self.validate_at(presented_key, device, Utc::now())
    }

    /// Validates `presented_key` for `device` as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` when the lookup or the bind write fails.
    /// Denials are returned as `Ok(Decision::Deny(..))`.
    pub fn validate_at(
        &self,
        presented_key: &str,
        device: &DeviceId,
        now: DateTime<Utc>,
    ) -> LicenseResult<Decision> {
        if self.override_admits(presented_key, device, now) {
            info!("Operator override accepted for device {}", device.short());
            return Ok(Decision::AllowAdmin);
        }

        let key = normalize_key(presented_key);
        let Some(record) = self.store.find_by_key(&key)? else {
            return Ok(deny(DenyReason::NotFound, None));
        };

        if !record.is_active {
            return Ok(deny(DenyReason::Inactive, Some(&record.id)));
        }
        if record.is_expired_at(now) {
            return Ok(deny(DenyReason::Expired, Some(&record.id)));
        }

        match &record.bound_device_id {
            None => self.claim(&record, device),
            Some(bound) if bound == device => {
                self.record_usage(&record.id);
                debug!("License key {} admitted on its bound device", record.id);
                Ok(Decision::Allow)
            }
            Some(_) => Ok(deny(DenyReason::DeviceMismatch, Some(&record.id))),
        }
    }

    fn override_admits(&self, presented_key: &str, device: &DeviceId, now: DateTime<Utc>) -> bool {
        let Some(public_key) = &self.override_key else {
            return false;
        };
        // License keys never contain a dot; skip verification for them.
        if !presented_key.contains('.') {
            return false;
        }
        match OverrideToken::parse_with_key(presented_key, public_key) {
            Ok(token) => {
                let admitted = token.authorizes(device, now);
                if !admitted {
                    warn!(
                        "Override token for device {} rejected (wrong device or outside its window)",
                        token.claims().dev.short()
                    );
                }
                admitted
            }
            Err(e) => {
                debug!("Presented key is not a valid override token: {}", e);
                false
            }
        }
    }

    /// First use of an unbound key: bind and count in one conditional write.
    fn claim(&self, record: &LicenseKey, device: &DeviceId) -> LicenseResult<Decision> {
        match self.store.try_bind_and_increment(&record.id, device, None)? {
            BindOutcome::Bound => {
                info!("License key {} bound to device {}", record.id, device.short());
                Ok(Decision::Allow)
            }
            BindOutcome::Conflict => {
                // Someone bound it between our read and write. A double
                // submission from this same device still gets in.
                let current = self.store.find_by_key(&record.key)?;
                match current {
                    Some(current) if current.is_bound_to(device) => {
                        self.record_usage(&current.id);
                        Ok(Decision::Allow)
                    }
                    _ => {
                        debug!("Lost bind race for license key {}", record.id);
                        Ok(deny(DenyReason::DeviceMismatch, Some(&record.id)))
                    }
                }
            }
        }
    }

    fn record_usage(&self, id: &KeyId) {
        if let Err(e) = self.store.increment_usage(id) {
            warn!("Failed to record usage of license key {}: {}", id, e);
        }
    }
}

fn deny(reason: DenyReason, id: Option<&KeyId>) -> Decision {
    match id {
        Some(id) => debug!("License key {} denied: {:?}", id, reason),
        None => debug!("License key denied: {:?}", reason),
    }
    Decision::Deny(reason)
}
