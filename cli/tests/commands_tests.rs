use chrono::{TimeZone, Utc};
use keysmith_cli::commands::{
    self, parse_key_value, parse_timestamp, GeneratedKeys, LicenseRequest,
};
use keysmith_cli::KeysmithConfig;
use keysmith_license::{
    generate_key_pair_with_rng, is_encrypted_private_key, ErrorKind, KeyPair, LicenseTier,
    SignatureAlgorithm, SignedLicense,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn test_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| {
        generate_key_pair_with_rng(&mut StdRng::seed_from_u64(42), 2048).unwrap()
    })
}

fn fast_config() -> KeysmithConfig {
    KeysmithConfig::from_toml_str("[kdf]\nmemory_cost = 1024\ntime_cost = 1\n").unwrap()
}

fn write_keys(dir: &Path) -> (PathBuf, PathBuf) {
    let private = dir.join("vendor.private.pem");
    let public = dir.join("vendor.public.pem");
    std::fs::write(&private, &test_keypair().private_key_pem).unwrap();
    std::fs::write(&public, &test_keypair().public_key_pem).unwrap();
    (private, public)
}

fn request() -> LicenseRequest {
    LicenseRequest {
        issuer: "Acme Corp".into(),
        licensed_to: "customer-42".into(),
        product_id: "X".into(),
        tier: LicenseTier::Enterprise,
        features: vec!["sso".into(), "export".into()],
        metadata: vec![("seats".into(), "25".into())],
        valid_from: parse_timestamp("2024-01-01").unwrap(),
        valid_to: parse_timestamp("2025-01-01").unwrap(),
    }
}

// ── argument parsing ─────────────────────────────────────────────

#[test]
fn timestamps_accept_dates_and_rfc3339() {
    let midnight = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_timestamp("2024-06-01").unwrap(), midnight);
    assert_eq!(parse_timestamp("2024-06-01T00:00:00Z").unwrap(), midnight);
    assert_eq!(parse_timestamp("2024-06-01T02:00:00+02:00").unwrap(), midnight);
    assert!(parse_timestamp("June 1st").is_err());
}

#[test]
fn key_values() {
    assert_eq!(
        parse_key_value("region=eu-west=1").unwrap(),
        ("region".to_string(), "eu-west=1".to_string())
    );
    assert_eq!(parse_key_value("empty=").unwrap(), ("empty".to_string(), String::new()));
    assert!(parse_key_value("novalue").is_err());
    assert!(parse_key_value("=x").is_err());
}

// ── keys ─────────────────────────────────────────────────────────

#[test]
fn keygen_writes_pair_and_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config();
    let keys: GeneratedKeys = commands::keygen(&config, Some(2048), dir.path(), "vendor", None).unwrap();

    assert!(!keys.encrypted);
    assert_eq!(
        commands::fingerprint(&keys.public_key_path).unwrap(),
        keys.fingerprint
    );
    assert_eq!(
        commands::public_key(&keys.private_key_path, None).unwrap(),
        std::fs::read_to_string(&keys.public_key_path).unwrap()
    );

    let err = commands::keygen(&config, Some(2048), dir.path(), "vendor", None).unwrap_err();
    assert!(err.to_string().contains("Refusing to overwrite"));
}

#[test]
fn keygen_rejects_weak_bits() {
    let dir = tempfile::tempdir().unwrap();
    assert!(commands::keygen(&fast_config(), Some(1024), dir.path(), "weak", None).is_err());
}

#[test]
fn encrypted_key_requires_password() {
    let dir = tempfile::tempdir().unwrap();
    let (private, public) = write_keys(dir.path());
    let encrypted = dir.path().join("vendor.enc.pem");
    commands::encrypt_key(&fast_config(), &private, &encrypted, "s3cret").unwrap();

    let pem = std::fs::read_to_string(&encrypted).unwrap();
    assert!(is_encrypted_private_key(&pem));

    assert!(commands::public_key(&encrypted, None).is_err());
    assert!(commands::public_key(&encrypted, Some("wrong")).is_err());
    assert_eq!(
        commands::public_key(&encrypted, Some("s3cret")).unwrap(),
        std::fs::read_to_string(public).unwrap()
    );
}

#[test]
fn encrypt_key_does_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let (private, public) = write_keys(dir.path());
    assert!(commands::encrypt_key(&fast_config(), &private, &public, "pw").is_err());
}

// ── licenses ─────────────────────────────────────────────────────

#[test]
fn sign_then_verify() {
    let dir = tempfile::tempdir().unwrap();
    let (private, public) = write_keys(dir.path());
    let out = dir.path().join("license.json");
    let config = fast_config();

    let signed = commands::sign_license(&config, &request(), &private, None, None, &out).unwrap();
    assert_eq!(SignedLicense::load(&out).unwrap(), signed);
    assert_eq!(signed.signature_algorithm, SignatureAlgorithm::RsaPssSha256);

    let at = parse_timestamp("2024-06-01").ok();
    let result = commands::verify_license(&config, &out, &public, at, None);
    assert!(result.is_valid, "{:?}", result.details);
    assert_eq!(result.payload.unwrap().tier, LicenseTier::Enterprise);

    let late = parse_timestamp("2025-06-01").ok();
    let result = commands::verify_license(&config, &out, &public, late, None);
    assert_eq!(result.error_kind, Some(ErrorKind::Expired));
}

#[test]
fn algorithm_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let (private, _) = write_keys(dir.path());
    let out = dir.path().join("license.json");
    let signed = commands::sign_license(
        &fast_config(),
        &request(),
        &private,
        None,
        Some(SignatureAlgorithm::RsaPkcs1v15Sha256),
        &out,
    )
    .unwrap();
    assert_eq!(signed.signature_algorithm, SignatureAlgorithm::RsaPkcs1v15Sha256);
}

#[test]
fn sign_with_encrypted_key() {
    let dir = tempfile::tempdir().unwrap();
    let (private, public) = write_keys(dir.path());
    let encrypted = dir.path().join("vendor.enc.pem");
    let config = fast_config();
    commands::encrypt_key(&config, &private, &encrypted, "pw").unwrap();

    let out = dir.path().join("license.json");
    assert!(commands::sign_license(&config, &request(), &encrypted, None, None, &out).is_err());
    commands::sign_license(&config, &request(), &encrypted, Some("pw"), None, &out).unwrap();

    let result =
        commands::verify_license(&config, &out, &public, parse_timestamp("2024-02-01").ok(), None);
    assert!(result.is_valid);
}

#[test]
fn clock_skew_flag_applies() {
    let dir = tempfile::tempdir().unwrap();
    let (private, public) = write_keys(dir.path());
    let out = dir.path().join("license.json");
    let config = fast_config();
    commands::sign_license(&config, &request(), &private, None, None, &out).unwrap();

    let just_after = parse_timestamp("2025-01-01T00:00:03Z").ok();
    let strict = commands::verify_license(&config, &out, &public, just_after, None);
    assert_eq!(strict.error_kind, Some(ErrorKind::Expired));
    let lenient = commands::verify_license(&config, &out, &public, just_after, Some(5));
    assert!(lenient.is_valid);
}

#[test]
fn verify_missing_license_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let (_, public) = write_keys(dir.path());
    let result = commands::verify_license(
        &fast_config(),
        &dir.path().join("missing.json"),
        &public,
        None,
        None,
    );
    assert_eq!(result.error_kind, Some(ErrorKind::IoError));
}

#[test]
fn inverted_window_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (private, _) = write_keys(dir.path());
    let mut req = request();
    std::mem::swap(&mut req.valid_from, &mut req.valid_to);
    let err = commands::sign_license(
        &fast_config(),
        &req,
        &private,
        None,
        None,
        &dir.path().join("license.json"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("invalid license payload"));
}

// ── product keys ─────────────────────────────────────────────────

#[test]
fn product_keys_are_sorted_and_distinct() {
    let keys = commands::product_keys(25).unwrap();
    assert_eq!(keys.len(), 25);
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    assert!(commands::product_keys(0).is_err());
    assert!(commands::product_keys(usize::MAX).is_err());
}
