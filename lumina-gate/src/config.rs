//! Gate configuration.
//!
//! Read from an optional JSON file; every field has a default, and
//! command-line flags override what the file says.

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use lumina_crypto::KdfParams;
use lumina_license::APP_DIR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Database file name used when no path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "lumina.db";

/// Gate settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Local state directory (device identity, shell state).
    pub state_dir: Option<PathBuf>,
    /// SQLite document store. Defaults to `lumina.db` in the state directory.
    pub database_path: Option<PathBuf>,
    /// Operator override public key, base64url (32 bytes). Absent
    /// disables override tokens.
    pub override_public_key: Option<String>,
    /// Argon2id parameters for the admin credential.
    pub kdf: KdfParams,
}

impl GateConfig {
    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Resolved state directory.
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .context("no platform data directory; pass --state-dir"),
        }
    }

    /// Resolved database path.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.state_dir()?.join(DEFAULT_DATABASE_FILE)),
        }
    }

    /// Decoded override public key, if configured.
    pub fn override_key(&self) -> Result<Option<[u8; 32]>> {
        let Some(encoded) = &self.override_public_key else {
            return Ok(None);
        };
        decode_key_bytes(encoded)
            .map(Some)
            .context("override_public_key must be 32 bytes of base64url")
    }
}

/// Decodes a base64url (unpadded) 32-byte key.
pub fn decode_key_bytes(encoded: &str) -> Result<[u8; 32]> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim())
        .context("invalid base64url")?;
    let Ok(key) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("expected 32 bytes, got {}", bytes.len());
    };
    Ok(key)
}

/// Encodes a 32-byte key as base64url (unpadded).
#[must_use]
pub fn encode_key_bytes(bytes: &[u8; 32]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
