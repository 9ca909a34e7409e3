//! License validation: signature authenticity and validity window.
//!
//! Validation answers "was this payload signed by the holder of the
//! matching private key, and is the reference time inside its window?".
//! It never consults revocation or business status; callers check the
//! returned payload against their own status store.

use crate::canonical::{canonicalize, payload_digest};
use crate::error::{ErrorKind, LicenseError, LicenseResult};
use crate::keypair::{fingerprint_of, parse_public_key};
use crate::payload::{timestamp, LicensePayload, PAYLOAD_FORMAT_VERSION};
use crate::signed::SignedLicense;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Options for a validation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Tolerance applied to both ends of the validity window. Defaults to zero.
    pub allowed_clock_skew: Duration,
    /// Time to check the window against. Defaults to the current time.
    pub reference_time: Option<DateTime<Utc>>,
}

impl ValidationOptions {
    /// Options checking against a fixed reference time.
    #[must_use]
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self {
            reference_time: Some(reference_time),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.allowed_clock_skew = skew;
        self
    }
}

/// Outcome of a validation call. Built fresh each time, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_kind: Option<ErrorKind>,
    /// Decoded payload, present only when `is_valid` is true.
    pub payload: Option<LicensePayload>,
    #[serde(with = "timestamp")]
    pub checked_at: DateTime<Utc>,
    pub details: BTreeMap<String, String>,
}

impl ValidationResult {
    fn success(payload: LicensePayload, details: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: true,
            error_kind: None,
            payload: Some(payload),
            checked_at: timestamp::now(),
            details,
        }
    }

    fn failure(error: &LicenseError, mut details: BTreeMap<String, String>) -> Self {
        details.insert("reason".to_string(), error.to_string());
        Self {
            is_valid: false,
            error_kind: Some(error.kind()),
            payload: None,
            checked_at: timestamp::now(),
            details,
        }
    }
}

/// Verifies [`SignedLicense`]s against a public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseValidator;

impl LicenseValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs every check and returns the verified payload.
    ///
    /// Order: public key parse, payload format version, signature, window.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::InvalidKeyFormat`] if the public key does not parse
    /// - [`LicenseError::MalformedInput`] for an unsupported payload format version
    /// - [`LicenseError::SignatureMismatch`] if the signature does not verify
    /// - [`LicenseError::NotYetValid`] / [`LicenseError::Expired`] outside the window
    /// - [`LicenseError::InvalidArgument`] for an unrepresentable clock skew
    pub fn verify<'a>(
        &self,
        signed: &'a SignedLicense,
        public_key_pem: &str,
        options: &ValidationOptions,
    ) -> LicenseResult<&'a LicensePayload> {
        let public_key = parse_public_key(public_key_pem)?;
        let payload = &signed.payload;

        if payload.format_version != PAYLOAD_FORMAT_VERSION {
            return Err(LicenseError::MalformedInput(format!(
                "unsupported payload format version {}",
                payload.format_version
            )));
        }

        let canonical = canonicalize(payload);
        signed
            .signature_algorithm
            .verify(&public_key, &canonical, &signed.signature)?;

        check_window(payload, options)?;
        Ok(payload)
    }

    /// Validates an in-memory license.
    #[must_use]
    pub fn validate(
        &self,
        signed: &SignedLicense,
        public_key_pem: &str,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let mut details = BTreeMap::new();
        details.insert("licenseId".to_string(), signed.payload.license_id.to_string());
        details.insert(
            "signatureAlgorithm".to_string(),
            signed.signature_algorithm.to_string(),
        );
        details.insert("keyFingerprint".to_string(), signed.key_fingerprint.clone());
        details.insert("payloadDigest".to_string(), payload_digest(&signed.payload));
        if let Ok(actual) = parse_public_key(public_key_pem).and_then(|k| fingerprint_of(&k)) {
            details.insert(
                "fingerprintMatch".to_string(),
                (actual == signed.key_fingerprint).to_string(),
            );
        }

        let result = match self.verify(signed, public_key_pem, options) {
            Ok(payload) => ValidationResult::success(payload.clone(), details),
            Err(err) => ValidationResult::failure(&err, details),
        };
        debug!(
            license_id = %signed.payload.license_id,
            valid = result.is_valid,
            error_kind = ?result.error_kind,
            "validated license"
        );
        result
    }

    /// Validates a license supplied as JSON.
    ///
    /// Undecodable JSON yields [`ErrorKind::MalformedInput`].
    #[must_use]
    pub fn validate_json(
        &self,
        license_json: &str,
        public_key_pem: &str,
        options: &ValidationOptions,
    ) -> ValidationResult {
        match SignedLicense::from_json(license_json) {
            Ok(signed) => self.validate(&signed, public_key_pem, options),
            Err(err) => ValidationResult::failure(&err, BTreeMap::new()),
        }
    }

    /// Validates a license JSON file against a PEM public key file.
    ///
    /// Unreadable files yield [`ErrorKind::IoError`], undecodable license
    /// JSON yields [`ErrorKind::MalformedInput`]. Reads are not retried.
    #[must_use]
    pub fn validate_file(
        &self,
        license_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|e| {
                let err = LicenseError::Io(e);
                let mut details = BTreeMap::new();
                details.insert("path".to_string(), path.display().to_string());
                ValidationResult::failure(&err, details)
            })
        };

        let license_json = match read(license_path.as_ref()) {
            Ok(json) => json,
            Err(result) => return result,
        };
        let public_key_pem = match read(public_key_path.as_ref()) {
            Ok(pem) => pem,
            Err(result) => return result,
        };
        self.validate_json(&license_json, &public_key_pem, options)
    }
}

/// Validates with default options (no skew, current time).
#[must_use]
pub fn validate(signed: &SignedLicense, public_key_pem: &str) -> ValidationResult {
    LicenseValidator::new().validate(signed, public_key_pem, &ValidationOptions::default())
}

fn check_window(payload: &LicensePayload, options: &ValidationOptions) -> LicenseResult<()> {
    let skew = chrono::Duration::from_std(options.allowed_clock_skew).map_err(|_| {
        LicenseError::InvalidArgument("allowed clock skew is out of range".to_string())
    })?;
    let reference = options.reference_time.unwrap_or_else(Utc::now);

    let latest = reference
        .checked_add_signed(skew)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let earliest = reference
        .checked_sub_signed(skew)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    if latest < payload.valid_from {
        return Err(LicenseError::NotYetValid(payload.valid_from));
    }
    if earliest > payload.valid_to {
        return Err(LicenseError::Expired(payload.valid_to));
    }
    Ok(())
}
