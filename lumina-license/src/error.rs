//! Error types for the admission core.
//!
//! Denials are not errors: they are [`crate::Decision::Deny`] values.
//! Errors here mean the question could not be answered.

use lumina_crypto::CryptoError;
use lumina_store::StoreError;
use thiserror::Error;

/// Admission-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The document store failed or timed out; the caller may retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Override token is not `payload.signature` or its payload is malformed.
    #[error("invalid override token: {0}")]
    InvalidOverrideToken(String),

    /// Ed25519 signature verification failed.
    #[error("override token signature invalid")]
    InvalidSignature,

    /// Configured override public key is not a valid Ed25519 point.
    #[error("invalid override public key")]
    InvalidOverrideKey,

    /// Password hashing failed.
    #[error("credential error: {0}")]
    Credential(#[from] CryptoError),

    /// The local device identity file is unusable.
    #[error("device identity error: {0}")]
    DeviceIdentity(String),

    /// Key issuance gave up.
    #[error("key issuance failed: {0}")]
    Issuance(String),

    /// IO error (local state files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for LicenseError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

/// Result type for admission operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
