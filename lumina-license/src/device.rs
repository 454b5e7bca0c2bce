//! Local device identity.
//!
//! Each installation generates one random identity the first time it is
//! asked for and keeps it in a small JSON file. License keys bind to this
//! value, so losing the file makes the installation look like a new
//! device; it is never rotated here.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use lumina_types::DeviceId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the persisted identity inside the state directory.
pub const DEVICE_FILE: &str = "device.json";

/// Directory name used under the platform data directory.
pub const APP_DIR: &str = "lumina";

#[derive(Debug, Serialize, Deserialize)]
struct DeviceRecord {
    device_id: DeviceId,
    created_at: DateTime<Utc>,
}

/// Handle to the persisted identity of this installation.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    path: PathBuf,
}

impl DeviceIdentity {
    /// Identity stored in `dir`/`device.json`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(DEVICE_FILE),
        }
    }

    /// Identity stored under the platform data directory
    /// (e.g. `~/.local/share/lumina/device.json`).
    pub fn default_location() -> LicenseResult<Self> {
        dirs::data_dir()
            .map(|dir| Self::in_dir(dir.join(APP_DIR)))
            .ok_or_else(|| {
                LicenseError::DeviceIdentity("no platform data directory".to_string())
            })
    }

    /// Returns the file backing this identity.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted identity, creating and persisting one first
    /// if none exists.
    pub fn get_or_create(&self) -> LicenseResult<DeviceId> {
        if let Some(id) = self.load()? {
            return Ok(id);
        }

        let record = DeviceRecord {
            device_id: DeviceId::generate(),
            created_at: Utc::now(),
        };
        self.persist(&record)?;
        info!("Generated device identity {}", record.device_id.short());
        Ok(record.device_id)
    }

    /// Returns the persisted identity without creating one.
    ///
    /// A file that exists but cannot be read back is an error rather than
    /// a reason to mint a new identity.
    pub fn load(&self) -> LicenseResult<Option<DeviceId>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: DeviceRecord = serde_json::from_str(&contents).map_err(|e| {
            LicenseError::DeviceIdentity(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Some(record.device_id))
    }

    /// Writes via a temporary file and rename so readers never observe a
    /// partial file.
    fn persist(&self, record: &DeviceRecord) -> LicenseResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
