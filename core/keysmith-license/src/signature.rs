//! RSA signature schemes.

use crate::error::{LicenseError, LicenseResult};
use rand::rngs::OsRng;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{pkcs1v15, pss, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

/// Signature scheme recorded in a `SignedLicense`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SignatureAlgorithm {
    /// RSASSA-PSS with SHA-256 and a digest-length salt. Randomized.
    #[default]
    RsaPssSha256,
    /// RSASSA-PKCS1-v1_5 with SHA-256. Deterministic.
    RsaPkcs1v15Sha256,
}

impl SignatureAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsaPssSha256 => "RSASSA-PSS-SHA256",
            Self::RsaPkcs1v15Sha256 => "RSASSA-PKCS1-v1_5-SHA256",
        }
    }

    /// Signs `message`, consuming the private key.
    ///
    /// Both schemes blind the private-key operation with `OsRng`. Blinding
    /// does not change PKCS#1 v1.5 output, which stays deterministic.
    pub(crate) fn sign(&self, key: RsaPrivateKey, message: &[u8]) -> LicenseResult<Vec<u8>> {
        let signature = match self {
            Self::RsaPssSha256 => pss::BlindedSigningKey::<Sha256>::new(key)
                .try_sign_with_rng(&mut OsRng, message)
                .map(|sig| sig.to_vec()),
            Self::RsaPkcs1v15Sha256 => pkcs1v15::SigningKey::<Sha256>::new(key)
                .try_sign_with_rng(&mut OsRng, message)
                .map(|sig| sig.to_vec()),
        };
        signature.map_err(|e| LicenseError::SigningFailed(e.to_string()))
    }

    /// Verifies `signature` over `message`.
    ///
    /// Every failure, including a signature of the wrong length, is
    /// [`LicenseError::SignatureMismatch`].
    pub(crate) fn verify(
        &self,
        key: &RsaPublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> LicenseResult<()> {
        let verified = match self {
            Self::RsaPssSha256 => pss::Signature::try_from(signature).and_then(|sig| {
                pss::VerifyingKey::<Sha256>::new(key.clone()).verify(message, &sig)
            }),
            Self::RsaPkcs1v15Sha256 => pkcs1v15::Signature::try_from(signature).and_then(|sig| {
                pkcs1v15::VerifyingKey::<Sha256>::new(key.clone()).verify(message, &sig)
            }),
        };
        verified.map_err(|_| LicenseError::SignatureMismatch)
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSASSA-PSS-SHA256" => Ok(Self::RsaPssSha256),
            "RSASSA-PKCS1-v1_5-SHA256" => Ok(Self::RsaPkcs1v15Sha256),
            other => Err(LicenseError::MalformedInput(format!(
                "unsupported signature algorithm {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for SignatureAlgorithm {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignatureAlgorithm> for String {
    fn from(algorithm: SignatureAlgorithm) -> Self {
        algorithm.as_str().to_string()
    }
}
