//! Human-readable product keys (`XXXX-XXXX-XXXX-XXXX`).
//!
//! Product keys are independent of signed licenses: they carry no data and
//! prove nothing cryptographically. They are short random codes for simple
//! activation flows.

use crate::error::{LicenseError, LicenseResult};
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Symbols used in product keys. No `I`, `O` or `0`.
pub const PRODUCT_KEY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ123456789";

const GROUP_COUNT: usize = 4;
const GROUP_SIZE: usize = 4;
const SEPARATOR: char = '-';

/// Largest batch [`ProductKey::generate_batch`] accepts.
pub const MAX_PRODUCT_KEY_BATCH: usize = 1_000_000;

const BATCH_PREALLOCATION: usize = 1024;

/// Displayed length including separators.
pub const PRODUCT_KEY_LENGTH: usize = GROUP_COUNT * GROUP_SIZE + GROUP_COUNT - 1;

/// A product key in canonical (upper-case, hyphenated) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductKey(String);

impl ProductKey {
    /// Generates a key from the OS CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    fn generate_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut key = String::with_capacity(PRODUCT_KEY_LENGTH);
        for group in 0..GROUP_COUNT {
            if group > 0 {
                key.push(SEPARATOR);
            }
            for _ in 0..GROUP_SIZE {
                let idx = rng.gen_range(0..PRODUCT_KEY_ALPHABET.len());
                key.push(char::from(PRODUCT_KEY_ALPHABET[idx]));
            }
        }
        Self(key)
    }

    /// Generates `count` distinct keys.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidArgument`] if `count` is zero or above
    /// [`MAX_PRODUCT_KEY_BATCH`].
    pub fn generate_batch(count: usize) -> LicenseResult<HashSet<ProductKey>> {
        if count == 0 {
            return Err(LicenseError::InvalidArgument(
                "product key count must be positive".to_string(),
            ));
        }
        if count > MAX_PRODUCT_KEY_BATCH {
            return Err(LicenseError::InvalidArgument(format!(
                "product key count {count} exceeds {MAX_PRODUCT_KEY_BATCH}"
            )));
        }
        let mut keys = HashSet::with_capacity(count.min(BATCH_PREALLOCATION));
        while keys.len() < count {
            keys.insert(Self::generate());
        }
        Ok(keys)
    }

    /// Normalizes user input, then checks its format.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidArgument`] if the normalized input is
    /// not a well-formed key.
    pub fn parse(input: &str) -> LicenseResult<Self> {
        let normalized = Self::normalize(input);
        if !Self::is_valid_format(&normalized) {
            return Err(LicenseError::InvalidArgument(format!(
                "not a product key: {input:?}"
            )));
        }
        Ok(Self(normalized))
    }

    /// Removes all whitespace and upper-cases the rest.
    #[must_use]
    pub fn normalize(input: &str) -> String {
        input
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Exact format check; no normalization is applied.
    #[must_use]
    pub fn is_valid_format(key: &str) -> bool {
        if key.len() != PRODUCT_KEY_LENGTH {
            return false;
        }
        let groups: Vec<&str> = key.split(SEPARATOR).collect();
        groups.len() == GROUP_COUNT
            && groups.iter().all(|group| {
                group.len() == GROUP_SIZE
                    && group.bytes().all(|b| PRODUCT_KEY_ALPHABET.contains(&b))
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductKey {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductKey> for String {
    fn from(key: ProductKey) -> Self {
        key.0
    }
}
