//! Store capabilities consumed by the admission core.
//!
//! Any document store offering read-by-field, a single-field
//! compare-and-set, and singleton create-if-absent can back the engine.

use crate::error::StoreResult;
use crate::model::{AdminCredential, LicenseKey};
use lumina_types::{DeviceId, KeyId};
use std::sync::Arc;

/// Outcome of the conditional bind write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The expected prior binding matched and the write was applied.
    Bound,
    /// The stored binding differed from the expected one; nothing changed.
    Conflict,
}

/// Access to license key documents.
pub trait KeyRecordStore: Send + Sync {
    /// Looks up a key document by its exact key string.
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseKey>>;

    /// Sets `bound_device_id = device` and increments `usage_count` in one
    /// atomic write, applied only if the stored binding still equals
    /// `expected`.
    fn try_bind_and_increment(
        &self,
        id: &KeyId,
        device: &DeviceId,
        expected: Option<&DeviceId>,
    ) -> StoreResult<BindOutcome>;

    /// Increments `usage_count` by one.
    fn increment_usage(&self, id: &KeyId) -> StoreResult<()>;

    /// Persists a newly issued key. Fails with `DuplicateKey` if the key
    /// string is taken and `InvalidData` if it is not in canonical form.
    fn insert(&self, record: &LicenseKey) -> StoreResult<()>;

    /// Lists all key documents, newest first.
    fn list(&self) -> StoreResult<Vec<LicenseKey>>;
}

/// Access to the singleton administrator credential.
pub trait AdminCredentialStore: Send + Sync {
    /// Loads the credential if one has been bootstrapped.
    fn load_admin(&self) -> StoreResult<Option<AdminCredential>>;

    /// Stores `credential` unless one already exists. Returns true if this
    /// call created it.
    fn create_admin_if_absent(&self, credential: &AdminCredential) -> StoreResult<bool>;

    /// Returns true if the credential has been bootstrapped.
    fn admin_exists(&self) -> StoreResult<bool> {
        Ok(self.load_admin()?.is_some())
    }
}

impl<T: KeyRecordStore + ?Sized> KeyRecordStore for &T {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseKey>> {
        (**self).find_by_key(key)
    }

    fn try_bind_and_increment(
        &self,
        id: &KeyId,
        device: &DeviceId,
        expected: Option<&DeviceId>,
    ) -> StoreResult<BindOutcome> {
        (**self).try_bind_and_increment(id, device, expected)
    }

    fn increment_usage(&self, id: &KeyId) -> StoreResult<()> {
        (**self).increment_usage(id)
    }

    fn insert(&self, record: &LicenseKey) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn list(&self) -> StoreResult<Vec<LicenseKey>> {
        (**self).list()
    }
}

impl<T: KeyRecordStore + ?Sized> KeyRecordStore for Arc<T> {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseKey>> {
        (**self).find_by_key(key)
    }

    fn try_bind_and_increment(
        &self,
        id: &KeyId,
        device: &DeviceId,
        expected: Option<&DeviceId>,
    ) -> StoreResult<BindOutcome> {
        (**self).try_bind_and_increment(id, device, expected)
    }

    fn increment_usage(&self, id: &KeyId) -> StoreResult<()> {
        (**self).increment_usage(id)
    }

    fn insert(&self, record: &LicenseKey) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn list(&self) -> StoreResult<Vec<LicenseKey>> {
        (**self).list()
    }
}

impl<T: AdminCredentialStore + ?Sized> AdminCredentialStore for &T {
    fn load_admin(&self) -> StoreResult<Option<AdminCredential>> {
        (**self).load_admin()
    }

    fn create_admin_if_absent(&self, credential: &AdminCredential) -> StoreResult<bool> {
        (**self).create_admin_if_absent(credential)
    }
}

impl<T: AdminCredentialStore + ?Sized> AdminCredentialStore for Arc<T> {
    fn load_admin(&self) -> StoreResult<Option<AdminCredential>> {
        (**self).load_admin()
    }

    fn create_admin_if_absent(&self, credential: &AdminCredential) -> StoreResult<bool> {
        (**self).create_admin_if_absent(credential)
    }
}
