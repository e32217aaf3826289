use toolsai_license::LicenseError;

#[test]
fn error_display_not_initialized() {
    let err = LicenseError::NotInitialized;
    assert!(format!("{err}").contains("not initialized"));
}

#[test]
fn error_display_empty_inputs() {
    assert!(LicenseError::EmptyUsername.to_string().contains("username cannot be empty"));
    assert!(LicenseError::EmptyLicenseKey.to_string().contains("license key cannot be empty"));
}

#[test]
fn error_display_invalid_key() {
    let err = LicenseError::InvalidLicenseKey;
    assert!(format!("{err}").contains("invalid license key"));
}

#[test]
fn error_display_stale_session() {
    let err = LicenseError::StaleSessionInvalid;
    assert!(format!("{err}").contains("saved session is invalid"));
}

#[test]
fn error_display_expired() {
    let err = LicenseError::Expired("2025-01-01".into());
    let msg = format!("{err}");
    assert!(msg.contains("expired"));
    assert!(msg.contains("2025-01-01"));
}

#[test]
fn error_display_handshake_and_transport() {
    assert!(LicenseError::Handshake("disabled".into()).to_string().contains("disabled"));
    assert!(LicenseError::Transport("timeout".into()).to_string().contains("network"));
}

#[test]
fn error_from_store() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: LicenseError = toolsai_store::StoreError::from(io).into();
    assert!(format!("{err}").contains("storage"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let license_err: LicenseError = serde_err.unwrap_err().into();
    assert!(format!("{license_err}").contains("serialization"));
}

#[test]
fn input_errors_are_classified() {
    assert!(LicenseError::EmptyUsername.is_input_error());
    assert!(LicenseError::EmptyLicenseKey.is_input_error());
    assert!(LicenseError::InvalidLicenseKey.is_input_error());
    assert!(!LicenseError::NotInitialized.is_input_error());
    assert!(!LicenseError::Transport("x".into()).is_input_error());
}

#[test]
fn every_message_is_non_empty() {
    let errors = [
        LicenseError::NotInitialized,
        LicenseError::EmptyUsername,
        LicenseError::EmptyLicenseKey,
        LicenseError::InvalidLicenseKey,
        LicenseError::StaleSessionInvalid,
        LicenseError::NotAuthenticated,
        LicenseError::Handshake(String::new()),
    ];
    for err in errors {
        assert!(!err.to_string().is_empty(), "{err:?}");
    }
}
