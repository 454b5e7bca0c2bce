//! Document store for license keys and the administrator credential.
//!
//! The admission core depends only on the [`KeyRecordStore`] and
//! [`AdminCredentialStore`] capabilities; [`SqliteStore`] is the bundled
//! implementation.
//!
//! # Consistency
//!
//! - Reads and single-document writes are strongly consistent.
//! - The device bind is a compare-and-set on `bound_device_id`, applied in
//!   one statement.
//! - The admin credential lives in a single-row table; creation is
//!   insert-if-absent.

mod error;
mod model;
mod sqlite;
mod traits;

pub use error::{StoreError, StoreResult};
pub use model::{AdminCredential, KeyDuration, LicenseKey, canonical_key};
pub use sqlite::{BUSY_TIMEOUT, SqliteStore};
pub use traits::{AdminCredentialStore, BindOutcome, KeyRecordStore};
