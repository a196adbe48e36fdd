//! Configuration loading and validation.
//!
//! Configuration comes from an optional TOML file layered under
//! `TRANSCODER_`-prefixed environment variables, with `__` separating
//! nested keys (`TRANSCODER_ENCODER__LAME_PATH=/opt/bin/lame`).

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_env, load_config_from_str, ENV_PREFIX};
pub use types::Config;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
