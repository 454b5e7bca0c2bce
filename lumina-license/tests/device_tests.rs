use lumina_license::{DEVICE_FILE, DeviceIdentity, LicenseError};

#[test]
fn first_call_creates_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let identity = DeviceIdentity::in_dir(dir.path());
    assert!(identity.load().unwrap().is_none());

    let id = identity.get_or_create().unwrap();
    assert!(dir.path().join(DEVICE_FILE).exists());
    assert_eq!(identity.load().unwrap(), Some(id));
}

#[test]
fn get_or_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let identity = DeviceIdentity::in_dir(dir.path());
    let first = identity.get_or_create().unwrap();
    let second = identity.get_or_create().unwrap();
    assert_eq!(first, second);
}

#[test]
fn identity_survives_new_handle() {
    let dir = tempfile::tempdir().unwrap();
    let first = DeviceIdentity::in_dir(dir.path()).get_or_create().unwrap();
    let second = DeviceIdentity::in_dir(dir.path()).get_or_create().unwrap();
    assert_eq!(first, second);
}

#[test]
fn separate_installations_differ() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let id_a = DeviceIdentity::in_dir(a.path()).get_or_create().unwrap();
    let id_b = DeviceIdentity::in_dir(b.path()).get_or_create().unwrap();
    assert_ne!(id_a, id_b);
}

#[test]
fn creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let identity = DeviceIdentity::in_dir(&nested);
    identity.get_or_create().unwrap();
    assert!(nested.join(DEVICE_FILE).exists());
}

#[test]
fn cleared_storage_yields_new_identity() {
    let dir = tempfile::tempdir().unwrap();
    let identity = DeviceIdentity::in_dir(dir.path());
    let before = identity.get_or_create().unwrap();
    std::fs::remove_file(identity.path()).unwrap();
    let after = identity.get_or_create().unwrap();
    assert_ne!(before, after);
}

#[test]
fn corrupt_file_is_an_error_not_a_new_identity() {
    let dir = tempfile::tempdir().unwrap();
    let identity = DeviceIdentity::in_dir(dir.path());
    std::fs::write(identity.path(), "not json").unwrap();

    let err = identity.get_or_create().unwrap_err();
    assert!(matches!(err, LicenseError::DeviceIdentity(_)));
    assert_eq!(std::fs::read_to_string(identity.path()).unwrap(), "not json");
}

#[test]
fn blank_stored_identity_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let identity = DeviceIdentity::in_dir(dir.path());
    std::fs::write(
        identity.path(),
        r#"{"device_id":"  ","created_at":"2025-06-15T12:00:00Z"}"#,
    )
    .unwrap();

    assert!(matches!(
        identity.get_or_create().unwrap_err(),
        LicenseError::DeviceIdentity(_)
    ));
    assert!(matches!(identity.load(), Err(LicenseError::DeviceIdentity(_))));
}

#[test]
fn leaves_no_temp_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    DeviceIdentity::in_dir(dir.path()).get_or_create().unwrap();
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec![DEVICE_FILE.to_string()]);
}
