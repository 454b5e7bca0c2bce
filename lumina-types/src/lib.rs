//! Core type definitions for Lumina admission control.
//!
//! This crate defines the small, storage-agnostic types shared by every
//! other crate in the workspace:
//! - License key document identifiers (UUID v7)
//! - Device identities (opaque random strings)
//! - Session roles
//!
//! Document shapes (license keys, the admin credential) live with the
//! store that persists them.

mod ids;
mod role;

pub use ids::{DeviceId, KeyId};
pub use role::Role;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
