//! SQLite-backed document store.
//!
//! One table per document kind. The device bind is a single conditional
//! `UPDATE`; whether it applied is read back from the affected-row count,
//! so two handles (or two processes) on the same file cannot both claim
//! an unbound key.

use crate::error::{StoreError, StoreResult};
use crate::model::{AdminCredential, KeyDuration, LicenseKey, canonical_key};
use crate::traits::{AdminCredentialStore, BindOutcome, KeyRecordStore};
use chrono::{DateTime, SecondsFormat, Utc};
use lumina_types::{DeviceId, KeyId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// How long a statement waits on a lock held by another connection
/// before the store reports itself unavailable.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const KEY_COLUMNS: &str = "id, key, valid_until, duration, price, created_at, is_active, usage_count, bound_device_id";

/// Document store backed by a single SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        debug!("opened store at {} (journal_mode={})", path.as_ref().display(), mode);
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS license_keys (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL UNIQUE,
                valid_until TEXT NOT NULL,
                duration TEXT NOT NULL,
                price INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                usage_count INTEGER NOT NULL DEFAULT 0,
                bound_device_id TEXT
            );

            CREATE TABLE IF NOT EXISTS admin_credential (
                singleton INTEGER PRIMARY KEY CHECK (singleton = 1),
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

// ── Row decoding ─────────────────────────────────────────────────

/// Raw column values, decoded outside the rusqlite row closure so field
/// errors surface as `InvalidData` rather than SQLite errors.
struct KeyRow {
    id: String,
    key: String,
    valid_until: String,
    duration: String,
    price: i64,
    created_at: String,
    is_active: bool,
    usage_count: i64,
    bound_device_id: Option<String>,
}

impl KeyRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            key: row.get(1)?,
            valid_until: row.get(2)?,
            duration: row.get(3)?,
            price: row.get(4)?,
            created_at: row.get(5)?,
            is_active: row.get(6)?,
            usage_count: row.get(7)?,
            bound_device_id: row.get(8)?,
        })
    }

    fn decode(self) -> StoreResult<LicenseKey> {
        let id = KeyId::parse(&self.id)
            .map_err(|e| StoreError::InvalidData(format!("key id {}: {e}", self.id)))?;
        let duration = self
            .duration
            .parse::<KeyDuration>()
            .map_err(StoreError::InvalidData)?;
        let usage_count = u64::try_from(self.usage_count)
            .map_err(|_| StoreError::InvalidData(format!("negative usage count on {id}")))?;

        // A present binding never reads back as unbound.
        let bound_device_id = self
            .bound_device_id
            .map(|bound| {
                DeviceId::new(bound).ok_or_else(|| {
                    StoreError::InvalidData(format!("blank device binding on {id}"))
                })
            })
            .transpose()?;

        Ok(LicenseKey {
            id,
            key: self.key,
            valid_until: parse_time(&self.valid_until)?,
            duration,
            price: self.price,
            created_at: parse_time(&self.created_at)?,
            is_active: self.is_active,
            usage_count,
            bound_device_id,
        })
    }
}

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_time(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("timestamp {s}: {e}")))
}

// ── License keys ─────────────────────────────────────────────────

impl KeyRecordStore for SqliteStore {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseKey>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {KEY_COLUMNS} FROM license_keys WHERE key = ?1"),
                params![key],
                KeyRow::read,
            )
            .optional()?;
        row.map(KeyRow::decode).transpose()
    }

    fn try_bind_and_increment(
        &self,
        id: &KeyId,
        device: &DeviceId,
        expected: Option<&DeviceId>,
    ) -> StoreResult<BindOutcome> {
        let conn = self.conn()?;
        let changed = match expected {
            None => conn.execute(
                "UPDATE license_keys
                 SET bound_device_id = ?1, usage_count = usage_count + 1
                 WHERE id = ?2 AND bound_device_id IS NULL",
                params![device.as_str(), id.to_string()],
            )?,
            Some(prior) => conn.execute(
                "UPDATE license_keys
                 SET bound_device_id = ?1, usage_count = usage_count + 1
                 WHERE id = ?2 AND bound_device_id = ?3",
                params![device.as_str(), id.to_string(), prior.as_str()],
            )?,
        };

        Ok(if changed == 1 {
            BindOutcome::Bound
        } else {
            BindOutcome::Conflict
        })
    }

    fn increment_usage(&self, id: &KeyId) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE license_keys SET usage_count = usage_count + 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn insert(&self, record: &LicenseKey) -> StoreResult<()> {
        if record.key.is_empty() || record.key != canonical_key(&record.key) {
            return Err(StoreError::InvalidData(format!(
                "key string of {} is not in canonical form",
                record.id
            )));
        }
        let usage_count = i64::try_from(record.usage_count)
            .map_err(|_| StoreError::InvalidData("usage count overflow".to_string()))?;
        let conn = self.conn()?;
        conn.execute(
            &format!("INSERT INTO license_keys ({KEY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                record.id.to_string(),
                record.key,
                format_time(&record.valid_until),
                record.duration.as_str(),
                record.price,
                format_time(&record.created_at),
                record.is_active,
                usage_count,
                record.bound_device_id.as_ref().map(DeviceId::as_str),
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<LicenseKey>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {KEY_COLUMNS} FROM license_keys ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map([], KeyRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(KeyRow::decode).collect()
    }
}

// ── Admin credential ─────────────────────────────────────────────

impl AdminCredentialStore for SqliteStore {
    fn load_admin(&self) -> StoreResult<Option<AdminCredential>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT username, password_hash, created_at FROM admin_credential WHERE singleton = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(username, password_hash, created_at)| {
            Ok(AdminCredential {
                username,
                password_hash,
                created_at: parse_time(&created_at)?,
            })
        })
        .transpose()
    }

    fn create_admin_if_absent(&self, credential: &AdminCredential) -> StoreResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO admin_credential (singleton, username, password_hash, created_at)
             VALUES (1, ?1, ?2, ?3)",
            params![
                credential.username,
                credential.password_hash,
                format_time(&credential.created_at),
            ],
        )?;
        Ok(changed == 1)
    }
}
