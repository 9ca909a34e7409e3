//! Command implementations. `main` handles argument parsing and output.

use crate::config::KeysmithConfig;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use keysmith_license::{
    decrypt_private_key, encrypt_private_key_with_params, extract_public_key,
    generate_key_pair, is_encrypted_private_key, key_fingerprint, LicensePayload,
    LicenseSigner, LicenseTier, LicenseValidator, ProductKey, SignatureAlgorithm, SignedLicense,
    ValidationResult,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Files written by [`keygen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKeys {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    pub fingerprint: String,
    pub encrypted: bool,
}

/// Generates a key pair into `<out_dir>/<name>.private.pem` and
/// `<out_dir>/<name>.public.pem`. Existing files are never overwritten.
pub fn keygen(
    config: &KeysmithConfig,
    bits: Option<usize>,
    out_dir: &Path,
    name: &str,
    password: Option<&str>,
) -> Result<GeneratedKeys> {
    let private_key_path = out_dir.join(format!("{name}.private.pem"));
    let public_key_path = out_dir.join(format!("{name}.public.pem"));
    for path in [&private_key_path, &public_key_path] {
        if path.exists() {
            bail!("Refusing to overwrite {}", path.display());
        }
    }

    let bits = bits.unwrap_or(config.keygen.bits);
    info!("Generating {bits}-bit RSA key pair");
    let keys = generate_key_pair(bits)?;

    let private_pem = match password {
        Some(pw) => Zeroizing::new(encrypt_private_key_with_params(
            &keys.private_key_pem,
            pw,
            &config.kdf_params(),
        )?),
        None => Zeroizing::new(keys.private_key_pem.clone()),
    };

    write_new(&private_key_path, private_pem.as_bytes())?;
    write_new(&public_key_path, keys.public_key_pem.as_bytes())?;

    Ok(GeneratedKeys {
        private_key_path,
        public_key_path,
        fingerprint: key_fingerprint(&keys.public_key_pem)?,
        encrypted: password.is_some(),
    })
}

/// Reads a private key file, decrypting it when it is password protected.
pub fn load_private_key(path: &Path, password: Option<&str>) -> Result<Zeroizing<String>> {
    let pem = Zeroizing::new(
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read private key {}", path.display()))?,
    );
    if !is_encrypted_private_key(&pem) {
        return Ok(pem);
    }

    let Some(password) = password else {
        bail!("Private key {} is password protected; no password supplied", path.display());
    };
    debug!("Decrypting private key {:?}", path);
    decrypt_private_key(&pem, password)
        .with_context(|| format!("Failed to decrypt private key {}", path.display()))
}

/// Returns the SPKI PEM public key of a private key file.
pub fn public_key(private_key_path: &Path, password: Option<&str>) -> Result<String> {
    let pem = load_private_key(private_key_path, password)?;
    Ok(extract_public_key(&pem)?)
}

/// Returns the SHA-256 fingerprint of a public key file.
pub fn fingerprint(public_key_path: &Path) -> Result<String> {
    let pem = fs::read_to_string(public_key_path)
        .with_context(|| format!("Failed to read public key {}", public_key_path.display()))?;
    Ok(key_fingerprint(&pem)?)
}

/// Writes a password-protected copy of a plaintext private key file.
pub fn encrypt_key(
    config: &KeysmithConfig,
    private_key_path: &Path,
    out: &Path,
    password: &str,
) -> Result<()> {
    let pem = load_private_key(private_key_path, None)?;
    let encrypted = encrypt_private_key_with_params(&pem, password, &config.kdf_params())?;
    write_new(out, encrypted.as_bytes())?;
    info!("Wrote encrypted private key to {:?}", out);
    Ok(())
}

/// License content supplied on the command line.
#[derive(Debug, Clone)]
pub struct LicenseRequest {
    pub issuer: String,
    pub licensed_to: String,
    pub product_id: String,
    pub tier: LicenseTier,
    pub features: Vec<String>,
    pub metadata: Vec<(String, String)>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl LicenseRequest {
    fn to_payload(&self) -> Result<LicensePayload> {
        let mut builder = LicensePayload::builder(&*self.issuer, &*self.licensed_to, &*self.product_id)
            .tier(self.tier)
            .features(self.features.iter().cloned())
            .validity(self.valid_from, self.valid_to);
        for (key, value) in &self.metadata {
            builder = builder.metadata(key.clone(), value.clone());
        }
        Ok(builder.build()?)
    }
}

/// Signs a license and writes it as JSON to `out`.
pub fn sign_license(
    config: &KeysmithConfig,
    request: &LicenseRequest,
    private_key_path: &Path,
    password: Option<&str>,
    algorithm: Option<SignatureAlgorithm>,
    out: &Path,
) -> Result<SignedLicense> {
    let payload = request.to_payload()?;
    let private_key = load_private_key(private_key_path, password)?;

    let mut options = config.signer_options();
    if let Some(algorithm) = algorithm {
        options.algorithm = algorithm;
    }
    let signed = LicenseSigner::new(options).sign(&payload, &private_key)?;

    signed
        .save(out)
        .with_context(|| format!("Failed to write license {}", out.display()))?;
    info!("Wrote license {} to {:?}", signed.payload.license_id, out);
    Ok(signed)
}

/// Validates a license file against a public key file.
#[must_use]
pub fn verify_license(
    config: &KeysmithConfig,
    license_path: &Path,
    public_key_path: &Path,
    at: Option<DateTime<Utc>>,
    clock_skew_secs: Option<u64>,
) -> ValidationResult {
    let mut options = config.validation_options();
    options.reference_time = at;
    if let Some(secs) = clock_skew_secs {
        options.allowed_clock_skew = Duration::from_secs(secs);
    }
    LicenseValidator::new().validate_file(license_path, public_key_path, &options)
}

/// Generates `count` distinct product keys in sorted order.
pub fn product_keys(count: usize) -> Result<Vec<ProductKey>> {
    let mut keys: Vec<ProductKey> = ProductKey::generate_batch(count)?.into_iter().collect();
    keys.sort();
    Ok(keys)
}

/// Parses `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected YYYY-MM-DD or RFC 3339, got {value:?}"))
}

/// Parses a `key=value` pair.
pub fn parse_key_value(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.trim().is_empty() => Ok((key.trim().to_string(), val.to_string())),
        _ => Err(format!("expected key=value, got {value:?}")),
    }
}

fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
