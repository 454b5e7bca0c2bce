//! Operator override signing key files.
//!
//! The private key is stored as base64url text. The file is created
//! with owner-only permissions on Unix and never overwritten.

use crate::config::{decode_key_bytes, encode_key_bytes};
use anyhow::{Context, Result};
use ed25519_dalek::SigningKey;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Writes `key` to a new file at `path`. Fails if the file exists.
pub fn write_signing_key(path: &Path, key: &SigningKey) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to create signing key {}", path.display()))?;
    file.write_all(encode_key_bytes(&key.to_bytes()).as_bytes())
        .context("Failed to write signing key")?;
    file.sync_all().context("Failed to flush signing key")?;
    Ok(())
}

/// Reads a key written by [`write_signing_key`].
pub fn read_signing_key(path: &Path) -> Result<SigningKey> {
    let encoded = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let seed = decode_key_bytes(&encoded).context("Failed to decode signing key")?;
    Ok(SigningKey::from_bytes(&seed))
}
