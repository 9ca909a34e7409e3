//! Error types for the licensing engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Payload is structurally invalid (missing identity, inverted window, ...).
    #[error("invalid license payload: {0}")]
    InvalidPayload(String),

    /// PEM could not be parsed as a supported key, or the key is unsound.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// RSA key generation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// The signing backend reported an error.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Signature does not verify. Tampering and wrong key are not told apart.
    #[error("license signature does not match")]
    SignatureMismatch,

    /// Reference time is before the validity window.
    #[error("license not valid before {0}")]
    NotYetValid(DateTime<Utc>),

    /// Reference time is after the validity window.
    #[error("license expired on {0}")]
    Expired(DateTime<Utc>),

    /// Sealing a private key under a password failed.
    #[error("private key encryption failed: {0}")]
    KeyEncryptionFailed(String),

    /// Wrong password, tampered ciphertext, or unreadable envelope.
    #[error("private key decryption failed")]
    DecryptionFailed,

    /// License JSON or envelope could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// File read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller supplied an out-of-range argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl LicenseError {
    /// Returns the fieldless kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::InvalidKeyFormat(_) => ErrorKind::InvalidKeyFormat,
            Self::KeyGenerationFailed(_) => ErrorKind::KeyGenerationFailed,
            Self::SigningFailed(_) => ErrorKind::SigningFailed,
            Self::SignatureMismatch => ErrorKind::SignatureMismatch,
            Self::NotYetValid(_) => ErrorKind::NotYetValid,
            Self::Expired(_) => ErrorKind::Expired,
            Self::KeyEncryptionFailed(_) => ErrorKind::KeyEncryptionFailed,
            Self::DecryptionFailed => ErrorKind::DecryptionFailed,
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::Io(_) => ErrorKind::IoError,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

impl From<serde_json::Error> for LicenseError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Fieldless error classification carried by a `ValidationResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ErrorKind {
    InvalidPayload,
    InvalidKeyFormat,
    KeyGenerationFailed,
    SigningFailed,
    SignatureMismatch,
    NotYetValid,
    Expired,
    KeyEncryptionFailed,
    DecryptionFailed,
    MalformedInput,
    IoError,
    InvalidArgument,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [ErrorKind] = &[
        Self::InvalidPayload,
        Self::InvalidKeyFormat,
        Self::KeyGenerationFailed,
        Self::SigningFailed,
        Self::SignatureMismatch,
        Self::NotYetValid,
        Self::Expired,
        Self::KeyEncryptionFailed,
        Self::DecryptionFailed,
        Self::MalformedInput,
        Self::IoError,
        Self::InvalidArgument,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "invalid_payload",
            Self::InvalidKeyFormat => "invalid_key_format",
            Self::KeyGenerationFailed => "key_generation_failed",
            Self::SigningFailed => "signing_failed",
            Self::SignatureMismatch => "signature_mismatch",
            Self::NotYetValid => "not_yet_valid",
            Self::Expired => "expired",
            Self::KeyEncryptionFailed => "key_encryption_failed",
            Self::DecryptionFailed => "decryption_failed",
            Self::MalformedInput => "malformed_input",
            Self::IoError => "io_error",
            Self::InvalidArgument => "invalid_argument",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid_payload" => Ok(Self::InvalidPayload),
            "invalid_key_format" => Ok(Self::InvalidKeyFormat),
            "key_generation_failed" => Ok(Self::KeyGenerationFailed),
            "signing_failed" => Ok(Self::SigningFailed),
            "signature_mismatch" => Ok(Self::SignatureMismatch),
            "not_yet_valid" => Ok(Self::NotYetValid),
            "expired" => Ok(Self::Expired),
            "key_encryption_failed" => Ok(Self::KeyEncryptionFailed),
            "decryption_failed" => Ok(Self::DecryptionFailed),
            "malformed_input" => Ok(Self::MalformedInput),
            "io_error" => Ok(Self::IoError),
            "invalid_argument" => Ok(Self::InvalidArgument),
            other => Err(LicenseError::MalformedInput(format!(
                "unknown error kind {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for ErrorKind {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ErrorKind> for String {
    fn from(kind: ErrorKind) -> Self {
        kind.as_str().to_string()
    }
}
