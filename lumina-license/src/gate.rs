//! Login flows for the shell.
//!
//! Wraps the engine, the admin gate and the local device identity into
//! the two login paths of the sign-in screen: license key, or
//! administrator credentials.

use crate::admin::{AdminGate, BootstrapResult};
use crate::decision::{Decision, DenyReason};
use crate::engine::AdmissionEngine;
use crate::error::LicenseResult;
use crate::session::{Session, SessionIssuer};
use lumina_crypto::KdfParams;
use lumina_store::{AdminCredentialStore, KeyRecordStore};
use lumina_types::{DeviceId, Role};

/// Result of a license key login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted(Session),
    Denied(DenyReason),
}

/// Result of a credential login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialOutcome {
    /// Admitted as administrator; `created` is true on bootstrap.
    Granted { session: Session, created: bool },
    /// Username or password did not match.
    Rejected,
}

/// Entry point for the shell's sign-in screen.
pub struct AccessGate<S> {
    engine: AdmissionEngine<S>,
    admin: AdminGate<S>,
    device: DeviceId,
}

impl<S> AccessGate<S>
where
    S: KeyRecordStore + AdminCredentialStore + Clone,
{
    /// Creates a gate for this installation's `device`.
    pub fn new(store: S, device: DeviceId) -> Self {
        Self {
            engine: AdmissionEngine::new(store.clone()),
            admin: AdminGate::new(store),
            device,
        }
    }

    /// Sets the hashing parameters used when the admin account is created.
    #[must_use]
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.admin = self.admin.with_params(params);
        self
    }

    /// Enables operator override tokens signed for `public_key`.
    pub fn with_override_key(mut self, public_key: &[u8; 32]) -> LicenseResult<Self> {
        self.engine = self.engine.with_override_key(public_key)?;
        Ok(self)
    }

    /// Returns this installation's device identity.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device
    }

    /// Returns true once the administrator account exists; the sign-in
    /// screen offers "create account" until then.
    pub fn admin_exists(&self) -> LicenseResult<bool> {
        self.admin.exists()
    }

    /// Validates a license key for this device.
    pub fn login_with_key(&self, key: &str) -> LicenseResult<LoginOutcome> {
        let decision = self.engine.validate(key, &self.device)?;
        Ok(match decision {
            Decision::Allow => LoginOutcome::Granted(SessionIssuer::issue(Role::Cashier)),
            Decision::AllowAdmin => LoginOutcome::Granted(SessionIssuer::issue(Role::Admin)),
            Decision::Deny(reason) => LoginOutcome::Denied(reason),
        })
    }

    /// Bootstraps or checks the administrator credential.
    pub fn login_with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> LicenseResult<CredentialOutcome> {
        let result = self.admin.bootstrap_or_validate(username, password)?;
        Ok(match result {
            BootstrapResult::Invalid => CredentialOutcome::Rejected,
            BootstrapResult::Created | BootstrapResult::Valid => CredentialOutcome::Granted {
                session: SessionIssuer::issue(Role::Admin),
                created: result == BootstrapResult::Created,
            },
        })
    }
}
