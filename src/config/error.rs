//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with `_s4g/serve.toml` or the options that override it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}
