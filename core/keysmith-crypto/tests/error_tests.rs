use keysmith_crypto::CryptoError;

#[test]
fn empty_password_is_a_caller_error() {
    let err = CryptoError::EmptyPassword;
    assert_eq!(err.to_string(), "password must not be empty");
    assert!(err.is_caller_error());
}

#[test]
fn kdf_out_of_range_names_every_cost() {
    let err = CryptoError::KdfParamsOutOfRange {
        memory_cost: 0,
        time_cost: 99,
        parallelism: 1,
    };
    assert_eq!(err.to_string(), "kdf parameters out of range: m=0 t=99 p=1");
    assert!(err.is_caller_error());
}

#[test]
fn backend_failures_are_not_caller_errors() {
    for err in [
        CryptoError::KeyDerivation("bad params".into()),
        CryptoError::Encryption("oops".into()),
        CryptoError::AuthenticationFailed,
        CryptoError::CiphertextTooShort { len: 3 },
        CryptoError::UnsupportedEnvelope("kdf \"scrypt\"".into()),
    ] {
        assert!(!err.is_caller_error(), "{err}");
    }
}

#[test]
fn authentication_failure_does_not_say_which() {
    let msg = CryptoError::AuthenticationFailed.to_string();
    assert!(msg.contains("wrong key or tampered data"));
}

#[test]
fn envelope_errors_keep_their_detail() {
    let msg = CryptoError::UnsupportedEnvelope("version 9".into()).to_string();
    assert!(msg.contains("unsupported sealed envelope"));
    assert!(msg.contains("version 9"));

    let msg = CryptoError::MalformedEnvelope("invalid salt base64".into()).to_string();
    assert!(msg.contains("malformed sealed envelope"));
    assert!(msg.contains("invalid salt base64"));
}

#[test]
fn invalid_nonce_length_reports_both_sizes() {
    let err = CryptoError::InvalidNonceLength {
        expected: 12,
        actual: 8,
    };
    let msg = err.to_string();
    assert!(msg.contains("12"));
    assert!(msg.contains("8"));
}

#[test]
fn serde_json_errors_convert() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let crypto_err: CryptoError = serde_err.unwrap_err().into();
    assert!(crypto_err.to_string().contains("serialization"));
}
