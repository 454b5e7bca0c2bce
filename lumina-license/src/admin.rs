//! The single administrator account.
//!
//! The first credential submitted to an installation with no account
//! becomes the permanent administrator. After that, submissions are
//! checked against it. There is no update path here.

use crate::error::{LicenseError, LicenseResult};
use chrono::Utc;
use lumina_crypto::{KdfParams, constant_time_eq, hash_password, verify_password};
use lumina_store::{AdminCredential, AdminCredentialStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of a credential submission.
///
/// `Invalid` never says whether the username or the password was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapResult {
    /// No account existed; this submission created it.
    Created,
    /// Matches the stored account.
    Valid,
    /// Does not match the stored account.
    Invalid,
}

impl BootstrapResult {
    /// Returns true if the submitter is now the administrator.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Created | Self::Valid)
    }
}

/// Bootstraps or checks the administrator credential.
pub struct AdminGate<S> {
    store: S,
    params: KdfParams,
}

impl<S: AdminCredentialStore> AdminGate<S> {
    /// Creates a gate hashing with the default Argon2id parameters.
    pub fn new(store: S) -> Self {
        Self {
            store,
            params: KdfParams::default(),
        }
    }

    /// Overrides the hashing parameters used at bootstrap.
    #[must_use]
    pub fn with_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }

    /// Returns true if the administrator account has been created.
    pub fn exists(&self) -> LicenseResult<bool> {
        Ok(self.store.admin_exists()?)
    }

    /// Creates the account if none exists, otherwise checks the submission
    /// against it.
    ///
    /// Blank usernames or passwords are `Invalid` and never create an
    /// account.
    pub fn bootstrap_or_validate(
        &self,
        username: &str,
        password: &str,
    ) -> LicenseResult<BootstrapResult> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Ok(BootstrapResult::Invalid);
        }

        if let Some(existing) = self.store.load_admin()? {
            return Ok(check(&existing, username, password));
        }

        let credential = AdminCredential {
            username: username.to_string(),
            password_hash: hash_password(password, &self.params)?,
            created_at: Utc::now(),
        };
        if self.store.create_admin_if_absent(&credential)? {
            info!("Administrator account created");
            return Ok(BootstrapResult::Created);
        }

        // A concurrent bootstrap won; judge this submission against it.
        match self.store.load_admin()? {
            Some(existing) => Ok(check(&existing, username, password)),
            None => Err(LicenseError::StoreUnavailable(
                "admin credential missing after insert conflict".to_string(),
            )),
        }
    }
}

/// Both comparisons always run so timing does not reveal which failed.
fn check(stored: &AdminCredential, username: &str, password: &str) -> BootstrapResult {
    let password_ok = match verify_password(password, &stored.password_hash) {
        Ok(ok) => ok,
        Err(e) => {
            warn!("Stored admin credential is unusable: {}", e);
            false
        }
    };
    let username_ok = constant_time_eq(stored.username.as_bytes(), username.as_bytes());

    if password_ok && username_ok {
        BootstrapResult::Valid
    } else {
        BootstrapResult::Invalid
    }
}
