//! Admission verdicts.

use lumina_types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a license key was refused.
///
/// Exhaustive; each variant is shown to the user as-is and never retried
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No key document with that key string.
    NotFound,
    /// The key has been revoked.
    Inactive,
    /// `valid_until` is in the past.
    Expired,
    /// The key is bound to a different device (or another device won the
    /// bind race).
    DeviceMismatch,
}

impl DenyReason {
    /// Returns the message shown on the login form.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "Invalid license key",
            Self::Inactive => "This license key has been deactivated",
            Self::Expired => "This license key has expired",
            Self::DeviceMismatch => "This license key is already in use on another device",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The verdict for a single validation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    /// Admitted with cashier privileges.
    Allow,
    /// Admitted with administrator privileges via the operator override.
    AllowAdmin,
    /// Refused.
    Deny(DenyReason),
}

impl Decision {
    /// Returns true for either allow variant.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow | Self::AllowAdmin)
    }

    /// Returns the session role granted, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Allow => Some(Role::Cashier),
            Self::AllowAdmin => Some(Role::Admin),
            Self::Deny(_) => None,
        }
    }

    /// Returns the denial reason, if refused.
    #[must_use]
    pub const fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Deny(reason) => Some(*reason),
            _ => None,
        }
    }
}
