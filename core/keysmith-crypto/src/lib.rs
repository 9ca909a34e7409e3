//! Cryptographic primitives shared by Keysmith crates.
//!
//! - Argon2id key derivation ([`derive_key`])
//! - ChaCha20-Poly1305 authenticated encryption ([`encrypt`], [`decrypt`])
//! - Password-sealed, self-describing envelopes ([`SealedEnvelope`])
//! - Account credential helpers ([`hash_password`], [`generate_secure_token`], ...)
//!
//! All randomness is drawn from the operating system CSPRNG.

mod cipher;
mod error;
mod key;
mod password;
mod sealed;

pub use cipher::{decrypt, encrypt, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KdfParams, Salt, KEY_SIZE, SALT_SIZE};
pub use password::{
    generate_secure_token, generate_temporary_password, hash_password, verify_password,
    PasswordHash, PASSWORD_SALT_SIZE, TEMPORARY_PASSWORD_LENGTH, TOKEN_SIZE,
};
pub use sealed::{SealedEnvelope, KDF_ARGON2ID, SEALED_FORMAT_VERSION};
