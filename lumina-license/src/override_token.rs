//! Operator override tokens.
//!
//! An override token admits one installation as administrator without a
//! license key, for a limited time. Tokens use the format
//! `base64url(claims).base64url(signature)`.
//!
//! The claims are a JSON object containing:
//! - `dev`: the device identity the token is issued for
//! - `iat`: issued-at timestamp (seconds since epoch)
//! - `exp`: expiry timestamp (seconds since epoch, exclusive)
//!
//! The Ed25519 signature covers `claims_b64.as_bytes()` (the encoded claims
//! string, not the decoded JSON). Only the public half of the operator key
//! is configured on installations.

use crate::error::{LicenseError, LicenseResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use lumina_types::DeviceId;
use serde::{Deserialize, Serialize};

/// Longest validity window accepted in a token.
pub const MAX_OVERRIDE_VALIDITY_SECS: i64 = 7 * 24 * 60 * 60;

/// Tolerated clock difference between the operator and the installation.
pub const CLOCK_SKEW_SECS: i64 = 5 * 60;

/// Signed content of an override token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideClaims {
    /// Device identity the token admits.
    pub dev: DeviceId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiry timestamp (seconds since epoch).
    pub exp: i64,
}

impl OverrideClaims {
    /// Claims for `device`, valid from `now` for `validity`.
    #[must_use]
    pub fn new(device: DeviceId, now: DateTime<Utc>, validity: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            dev: device,
            iat,
            exp: iat + validity.num_seconds(),
        }
    }
}

/// A parsed override token whose signature has been verified.
#[derive(Debug, Clone)]
pub struct OverrideToken {
    claims: OverrideClaims,
}

impl OverrideToken {
    /// Parses a token and verifies its signature against `public_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid or the signature does
    /// not verify.
    pub fn parse_with_key(token: &str, public_key: &VerifyingKey) -> LicenseResult<Self> {
        let token = token.trim();

        let Some((claims_b64, signature_b64)) = token.split_once('.') else {
            return Err(LicenseError::InvalidOverrideToken(
                "token must have exactly two parts separated by a dot".to_string(),
            ));
        };
        if signature_b64.contains('.') {
            return Err(LicenseError::InvalidOverrideToken(
                "token must have exactly two parts separated by a dot".to_string(),
            ));
        }

        let sig_bytes = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
            LicenseError::InvalidOverrideToken(format!("invalid signature base64: {e}"))
        })?;
        let signature = Signature::from_slice(&sig_bytes).map_err(|_| {
            LicenseError::InvalidOverrideToken("invalid signature length".to_string())
        })?;

        public_key
            .verify(claims_b64.as_bytes(), &signature)
            .map_err(|_| LicenseError::InvalidSignature)?;

        let claims_json = URL_SAFE_NO_PAD.decode(claims_b64).map_err(|e| {
            LicenseError::InvalidOverrideToken(format!("invalid claims base64: {e}"))
        })?;
        let claims: OverrideClaims = serde_json::from_slice(&claims_json).map_err(|e| {
            LicenseError::InvalidOverrideToken(format!("invalid claims JSON: {e}"))
        })?;

        Ok(Self { claims })
    }

    /// Returns the verified claims.
    #[must_use]
    pub fn claims(&self) -> &OverrideClaims {
        &self.claims
    }

    /// Returns true if the token admits `device` at `now`.
    ///
    /// Tokens whose window is inverted or longer than
    /// [`MAX_OVERRIDE_VALIDITY_SECS`] never authorize.
    #[must_use]
    pub fn authorizes(&self, device: &DeviceId, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        let window = self.claims.exp - self.claims.iat;
        self.claims.dev == *device
            && window > 0
            && window <= MAX_OVERRIDE_VALIDITY_SECS
            && self.claims.iat <= now + CLOCK_SKEW_SECS
            && now < self.claims.exp
    }
}

/// Parses a configured 32-byte Ed25519 public key.
pub fn override_public_key(bytes: &[u8; 32]) -> LicenseResult<VerifyingKey> {
    VerifyingKey::from_bytes(bytes).map_err(|_| LicenseError::InvalidOverrideKey)
}

/// Signs `claims` with the operator key, producing a token string.
pub fn sign_override_token(
    signing_key: &SigningKey,
    claims: &OverrideClaims,
) -> LicenseResult<String> {
    let claims_json = serde_json::to_vec(claims)?;
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json);
    let signature = signing_key.sign(claims_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    Ok(format!("{claims_b64}.{sig_b64}"))
}
