//! `keysmith.toml` loading.
//!
//! ```toml
//! [keygen]
//! bits = 4096
//!
//! [signing]
//! algorithm = "RSASSA-PSS-SHA256"
//!
//! [validation]
//! clock_skew_secs = 30
//!
//! [kdf]
//! memory_cost = 19456
//! time_cost = 2
//! parallelism = 1
//! ```
//!
//! Every section and key is optional.

use anyhow::{bail, Context, Result};
use keysmith_license::{
    KdfParams, SignatureAlgorithm, SignerOptions, ValidationOptions, DEFAULT_KEY_BITS,
    MAX_KEY_BITS, MIN_KEY_BITS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "keysmith.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysmithConfig {
    pub keygen: KeygenConfig,
    pub signing: SigningConfig,
    pub validation: ValidationConfig,
    pub kdf: KdfConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeygenConfig {
    #[serde(default = "default_bits")]
    pub bits: usize,
}

fn default_bits() -> usize {
    DEFAULT_KEY_BITS
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            bits: default_bits(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    pub algorithm: SignatureAlgorithm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Tolerance applied to both ends of a license's validity window.
    pub clock_skew_secs: u64,
}

/// Argon2id costs for `encrypt-key` and `keygen --encrypt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_cost() -> u32 {
    KdfParams::default().memory_cost
}

fn default_time_cost() -> u32 {
    KdfParams::default().time_cost
}

fn default_parallelism() -> u32 {
    KdfParams::default().parallelism
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_memory_cost(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
        }
    }
}

impl KeysmithConfig {
    /// Loads configuration.
    ///
    /// With `path == None` the default file is read if it exists and
    /// defaults are used otherwise. An explicit path must exist. Parse
    /// and range errors are always fatal.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parses and range-checks a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let bits = self.keygen.bits;
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
            bail!("keygen.bits must be between {MIN_KEY_BITS} and {MAX_KEY_BITS}, got {bits}");
        }
        self.kdf_params()
            .check_bounds()
            .map_err(|e| anyhow::anyhow!("kdf: {e}"))?;
        Ok(())
    }

    #[must_use]
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_cost: self.kdf.memory_cost,
            time_cost: self.kdf.time_cost,
            parallelism: self.kdf.parallelism,
        }
    }

    #[must_use]
    pub fn signer_options(&self) -> SignerOptions {
        SignerOptions {
            algorithm: self.signing.algorithm,
        }
    }

    #[must_use]
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::default()
            .with_clock_skew(Duration::from_secs(self.validation.clock_skew_secs))
    }
}
