//! License signing.

use crate::canonical::canonicalize;
use crate::error::{LicenseError, LicenseResult};
use crate::keypair::{fingerprint_of, parse_private_key};
use crate::payload::{timestamp, LicensePayload};
use crate::signature::SignatureAlgorithm;
use crate::signed::SignedLicense;
use tracing::debug;

/// Signing configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignerOptions {
    /// Scheme used for new signatures. Defaults to RSASSA-PSS-SHA256.
    pub algorithm: SignatureAlgorithm,
}

/// Produces [`SignedLicense`]s from payloads and private keys.
///
/// Holds no key material; the private key is parsed per call and dropped
/// (and zeroized) before `sign` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseSigner {
    options: SignerOptions,
}

impl LicenseSigner {
    #[must_use]
    pub fn new(options: SignerOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &SignerOptions {
        &self.options
    }

    /// Signs `payload` with `private_key_pem`.
    ///
    /// The signature is checked against the derived public key before the
    /// license is returned.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::InvalidPayload`] if the payload fails its structural checks
    /// - [`LicenseError::InvalidKeyFormat`] if the key does not parse
    /// - [`LicenseError::SigningFailed`] for any backend failure
    pub fn sign(
        &self,
        payload: &LicensePayload,
        private_key_pem: &str,
    ) -> LicenseResult<SignedLicense> {
        payload.check_structure()?;

        let private_key = parse_private_key(private_key_pem)?;
        let public_key = private_key.to_public_key();
        let algorithm = self.options.algorithm;

        let canonical = canonicalize(payload);
        let signature = algorithm.sign(private_key, &canonical)?;

        algorithm
            .verify(&public_key, &canonical, &signature)
            .map_err(|_| {
                LicenseError::SigningFailed("signature failed verification after signing".to_string())
            })?;

        let key_fingerprint = fingerprint_of(&public_key)?;
        debug!(
            license_id = %payload.license_id,
            %algorithm,
            fingerprint = %key_fingerprint,
            "signed license"
        );

        Ok(SignedLicense {
            payload: payload.clone(),
            signature_algorithm: algorithm,
            signature,
            signed_at: timestamp::now(),
            key_fingerprint,
        })
    }
}

/// Signs `payload` with the default options (RSASSA-PSS-SHA256).
pub fn sign(payload: &LicensePayload, private_key_pem: &str) -> LicenseResult<SignedLicense> {
    LicenseSigner::default().sign(payload, private_key_pem)
}
