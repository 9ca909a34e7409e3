//! Account credential helpers: salted password hashes, bearer tokens and
//! temporary passwords.
//!
//! # Limitation
//!
//! [`hash_password`] is a single SHA-256 pass over `password || salt`. It is
//! salted but not memory-hard; replace it with Argon2id (see
//! [`crate::derive_key`]) while keeping the [`PasswordHash`] shape when the
//! stored hashes can be migrated.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, seq::SliceRandom, Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Size of password salts in bytes.
pub const PASSWORD_SALT_SIZE: usize = 32;

/// Size of secure tokens in bytes (before base64).
pub const TOKEN_SIZE: usize = 32;

/// Length of generated temporary passwords.
pub const TEMPORARY_PASSWORD_LENGTH: usize = 12;

const UPPERCASE: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijkmnpqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*?-_";

/// A base64 password hash together with its base64 salt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Hashes `password` with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; PASSWORD_SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    PasswordHash {
        hash: STANDARD.encode(salted_digest(password, &salt)),
        salt: STANDARD.encode(salt),
    }
}

/// Checks `password` against a stored hash and salt in constant time.
///
/// Returns `false` for undecodable hash or salt values.
#[must_use]
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let (Ok(expected), Ok(salt)) = (STANDARD.decode(hash), STANDARD.decode(salt)) else {
        return false;
    };

    let actual = salted_digest(password, &salt);
    actual[..].ct_eq(&expected[..]).into()
}

/// Returns 32 random bytes encoded as base64.
#[must_use]
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; TOKEN_SIZE];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Returns a 12-character password containing at least one uppercase
/// letter, lowercase letter, digit and symbol.
#[must_use]
pub fn generate_temporary_password() -> String {
    let mut rng = OsRng;
    let classes = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];
    let all = classes.concat();

    let mut chars: Vec<u8> = classes.iter().map(|set| pick(set, &mut rng)).collect();
    while chars.len() < TEMPORARY_PASSWORD_LENGTH {
        chars.push(pick(&all, &mut rng));
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

fn pick(set: &[u8], rng: &mut OsRng) -> u8 {
    set[rng.gen_range(0..set.len())]
}

fn salted_digest(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    hasher.finalize().into()
}
