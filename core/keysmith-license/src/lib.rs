//! License issuance and validation for Keysmith.
//!
//! This crate handles:
//! - RSA signing identities (generation, PEM parsing, fingerprints, password wrapping)
//! - Deterministic canonical encoding of license payloads
//! - Signing payloads into portable [`SignedLicense`] JSON artifacts
//! - Validating signatures and validity windows, with clock skew
//! - Human-readable product keys
//!
//! # Trust boundary
//!
//! A valid [`ValidationResult`] proves that a payload was issued by the
//! holder of the private key and that the reference time falls inside its
//! window. It says nothing about revocation or suspension: callers look up
//! [`LicensePayload::license_id`] in their own status store afterwards.
//!
//! # Example
//!
//! ```no_run
//! use chrono::{TimeZone, Utc};
//! use keysmith_license::{generate_key_pair, sign, validate, LicensePayload};
//!
//! # fn main() -> keysmith_license::LicenseResult<()> {
//! let keys = generate_key_pair(4096)?;
//! let payload = LicensePayload::builder("Acme Corp", "customer-42", "X")
//!     .feature("export")
//!     .validity(
//!         Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
//!     )
//!     .build()?;
//! let signed = sign(&payload, &keys.private_key_pem)?;
//! let result = validate(&signed, &keys.public_key_pem);
//! println!("valid: {}", result.is_valid);
//! # Ok(())
//! # }
//! ```

mod canonical;
mod error;
mod keypair;
mod payload;
mod product_key;
mod signature;
mod signed;
mod signer;
mod validator;

pub use canonical::{canonicalize, payload_digest, CANONICAL_HEADER};
pub use error::{ErrorKind, LicenseError, LicenseResult};
pub use keypair::{
    decrypt_private_key, encrypt_private_key, encrypt_private_key_with_params,
    extract_public_key, generate_key_pair, generate_key_pair_with_rng, is_encrypted_private_key,
    key_fingerprint, validate_private_key, validate_public_key, KeyPair, DEFAULT_KEY_BITS,
    ENCRYPTED_KEY_PEM_LABEL, MAX_KEY_BITS, MIN_KEY_BITS, RECOMMENDED_KEY_BITS,
};
pub use payload::{LicensePayload, LicensePayloadBuilder, LicenseTier, PAYLOAD_FORMAT_VERSION};
pub use product_key::{ProductKey, MAX_PRODUCT_KEY_BATCH, PRODUCT_KEY_ALPHABET, PRODUCT_KEY_LENGTH};
pub use signature::SignatureAlgorithm;
pub use signed::SignedLicense;
pub use signer::{sign, LicenseSigner, SignerOptions};
pub use validator::{validate, LicenseValidator, ValidationOptions, ValidationResult};

pub use keysmith_crypto::KdfParams;
