//! Configuration and command implementations behind the `keysmith` binary.

pub mod commands;
pub mod config;

pub use config::{KeysmithConfig, DEFAULT_CONFIG_FILE};
