//! Password-sealed envelopes.
//!
//! An envelope carries everything needed to open it again with nothing but
//! the password: KDF name and costs, salt, nonce and ciphertext. The header
//! fields are bound into the AEAD tag as associated data, so editing the
//! stored costs or salt fails authentication just like editing the
//! ciphertext does.

use crate::cipher::{self, EncryptedData};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, KdfParams, Salt};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Current envelope format version.
pub const SEALED_FORMAT_VERSION: u8 = 1;

/// Name of the only supported key-derivation function.
pub const KDF_ARGON2ID: &str = "argon2id";

/// A self-describing, password-encrypted blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    /// Envelope format version.
    pub version: u8,
    /// Key-derivation function name.
    pub kdf: String,
    /// Key-derivation costs.
    pub kdf_params: KdfParams,
    /// Base64 salt.
    pub salt: String,
    /// Base64 nonce.
    pub nonce: String,
    /// Base64 ciphertext including the authentication tag.
    pub ciphertext: String,
}

impl SealedEnvelope {
    /// Encrypts `plaintext` under a key derived from `password`.
    pub fn seal(password: &str, plaintext: &[u8], params: &KdfParams) -> CryptoResult<Self> {
        if password.is_empty() {
            return Err(CryptoError::EmptyPassword);
        }

        let salt = Salt::random();
        let key = derive_key(password, &salt, params)?;

        let mut envelope = Self {
            version: SEALED_FORMAT_VERSION,
            kdf: KDF_ARGON2ID.to_string(),
            kdf_params: *params,
            salt: STANDARD.encode(salt.as_bytes()),
            nonce: String::new(),
            ciphertext: String::new(),
        };

        let encrypted = cipher::encrypt(&key, plaintext, &envelope.associated_data())?;
        envelope.nonce = STANDARD.encode(encrypted.nonce);
        envelope.ciphertext = STANDARD.encode(&encrypted.ciphertext);
        Ok(envelope)
    }

    /// Decrypts the envelope with `password`.
    pub fn open(&self, password: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
        if self.version != SEALED_FORMAT_VERSION {
            return Err(CryptoError::UnsupportedEnvelope(format!(
                "version {}",
                self.version
            )));
        }
        if self.kdf != KDF_ARGON2ID {
            return Err(CryptoError::UnsupportedEnvelope(format!(
                "kdf {:?}",
                self.kdf
            )));
        }

        let salt = Salt::from_slice(&decode_field("salt", &self.salt)?)?;
        let encrypted = EncryptedData::from_parts(
            &decode_field("nonce", &self.nonce)?,
            decode_field("ciphertext", &self.ciphertext)?,
        )?;

        let key = derive_key(password, &salt, &self.kdf_params)?;
        cipher::decrypt(&key, &encrypted, &self.associated_data())
    }

    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an envelope from JSON.
    pub fn from_json(json: &str) -> CryptoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn associated_data(&self) -> Vec<u8> {
        format!(
            "keysmith-sealed/v{};{};m={};t={};p={};salt={}",
            self.version,
            self.kdf,
            self.kdf_params.memory_cost,
            self.kdf_params.time_cost,
            self.kdf_params.parallelism,
            self.salt
        )
        .into_bytes()
    }
}

fn decode_field(name: &str, value: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid {name} base64: {e}")))
}
