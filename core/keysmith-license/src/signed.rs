//! The signed license artifact and its portable JSON form.

use crate::error::{LicenseError, LicenseResult};
use crate::payload::{timestamp, LicensePayload};
use crate::signature::SignatureAlgorithm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A license payload together with its signature and signing metadata.
///
/// JSON field names (`payload`, `signatureAlgorithm`, `signature`,
/// `signedAt`, `keyFingerprint`) are stable across engine versions that
/// share a payload format version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedLicense {
    pub payload: LicensePayload,
    pub signature_algorithm: SignatureAlgorithm,
    /// Raw signature bytes (standard base64 in JSON).
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
    #[serde(with = "timestamp")]
    pub signed_at: DateTime<Utc>,
    /// Hex SHA-256 of the signer's SPKI public key. Not covered by the signature.
    pub key_fingerprint: String,
}

impl SignedLicense {
    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> LicenseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a license from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MalformedInput`] for any decoding failure.
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a license JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Io`] if the file cannot be read and
    /// [`LicenseError::MalformedInput`] if it does not decode.
    pub fn load(path: impl AsRef<Path>) -> LicenseResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Writes the license as JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> LicenseResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD
            .decode(raw.trim())
            .map_err(|e| de::Error::custom(format!("invalid signature base64: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_algorithm_is_malformed() {
        let err = "RSASSA-MD5".parse::<SignatureAlgorithm>().unwrap_err();
        assert!(matches!(err, LicenseError::MalformedInput(_)));
    }
}
