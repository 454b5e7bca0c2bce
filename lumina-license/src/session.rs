//! Session descriptors handed to the shell.
//!
//! Sessions carry no expiry; the shell treats a stored session as
//! authenticated until logout clears it.

use crate::decision::Decision;
use chrono::{DateTime, Utc};
use lumina_types::Role;
use serde::{Deserialize, Serialize};

/// An opened session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Builds sessions. Stateless; holds no revocation authority.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionIssuer;

impl SessionIssuer {
    /// Issues a session for `role` at the current time.
    #[must_use]
    pub fn issue(role: Role) -> Session {
        Self::issue_at(role, Utc::now())
    }

    #[must_use]
    pub fn issue_at(role: Role, issued_at: DateTime<Utc>) -> Session {
        Session { role, issued_at }
    }

    /// Issues the session an admission decision grants, if any.
    #[must_use]
    pub fn for_decision(decision: &Decision) -> Option<Session> {
        decision.role().map(Self::issue)
    }
}
