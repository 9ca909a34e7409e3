//! Failure modes of key derivation, AEAD and sealed envelopes.

use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealing refuses an empty password.
    #[error("password must not be empty")]
    EmptyPassword,

    /// Argon2id costs are zero or above the accepted ceilings.
    #[error("kdf parameters out of range: m={memory_cost} t={time_cost} p={parallelism}")]
    KdfParamsOutOfRange {
        memory_cost: u32,
        time_cost: u32,
        parallelism: u32,
    },

    /// The Argon2 backend rejected the derivation.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// AEAD tag mismatch: wrong password or key, or tampered data.
    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailed,

    /// Ciphertext shorter than the authentication tag.
    #[error("ciphertext too short: {len} bytes")]
    CiphertextTooShort { len: usize },

    /// Envelope version or KDF this build cannot open.
    #[error("unsupported sealed envelope: {0}")]
    UnsupportedEnvelope(String),

    /// Envelope field could not be decoded.
    #[error("malformed sealed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CryptoError {
    /// True for failures caused by the caller's password or KDF costs.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::EmptyPassword | Self::KdfParamsOutOfRange { .. })
    }
}
