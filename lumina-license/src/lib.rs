//! License admission control for the Lumina point of sale.
//!
//! This crate decides whether a device may open a session:
//! - License keys admit one device each, as cashier, until they expire
//! - The first device to use a key claims it (compare-and-set bind)
//! - A single administrator account is created on first credential login
//! - Signed, expiring override tokens admit a specific device as admin
//!
//! # Design Principles
//!
//! - **Single verdict**: checks run in a fixed order and stop at the first
//!   denial reason
//! - **Atomic claim**: binding a key is one conditional write, never a
//!   read-then-write pair
//! - **Errors are not denials**: store faults surface as
//!   [`LicenseError::StoreUnavailable`]
//! - **Login-time only**: nothing is re-validated during a session
//!
//! # Key Format
//!
//! Issued keys look like `KSR-7KQM-X2PD-9HTA`; input is trimmed and
//! upper-cased before lookup.

mod admin;
mod decision;
mod device;
mod engine;
mod error;
mod gate;
mod issue;
mod override_token;
mod session;

pub use admin::{AdminGate, BootstrapResult};
pub use decision::{Decision, DenyReason};
pub use device::{APP_DIR, DEVICE_FILE, DeviceIdentity};
pub use engine::AdmissionEngine;
pub use error::{LicenseError, LicenseResult};
pub use gate::{AccessGate, CredentialOutcome, LoginOutcome};
pub use issue::{KEY_PREFIX, KeyIssuer, generate_key_code, normalize_key};
pub use override_token::{
    CLOCK_SKEW_SECS, MAX_OVERRIDE_VALIDITY_SECS, OverrideClaims, OverrideToken,
    override_public_key, sign_override_token,
};
pub use session::{Session, SessionIssuer};
