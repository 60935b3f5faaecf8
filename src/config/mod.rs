//! Dev server configuration (`_s4g/serve.toml`).
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `[serve]`    | Listener address, port, debounce, watch toggle |
//! | `[renderer]` | Command of the renderer process                |
//!
//! The file is optional. Command-line flags win over file values.

mod error;
mod renderer;
mod serve;

pub use error::ConfigError;
pub use renderer::RendererConfig;
pub use serve::ServeConfig;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::ServeArgs;
use crate::debug;
use crate::utils::path::normalize_path;

pub const CONFIG_PATH: &str = "_s4g/serve.toml";

/// Root configuration structure representing `_s4g/serve.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevConfig {
    /// Absolute site folder (internal use only)
    #[serde(skip)]
    pub site_dir: PathBuf,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub renderer: RendererConfig,
}

impl DevConfig {
    /// File values, then CLI overrides, then validation.
    pub fn load(args: &ServeArgs) -> Result<Self> {
        let site_dir = normalize_path(&args.folder);
        if !site_dir.is_dir() {
            anyhow::bail!("site folder `{}` does not exist", args.folder.display());
        }

        let mut config = Self::from_path(&site_dir.join(CONFIG_PATH))?;
        config.site_dir = site_dir;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Missing file means defaults.
    fn from_path(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("config"; "loaded {}", path.display());
                Self::from_str(&content).with_context(|| format!("invalid {}", path.display()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(path.to_path_buf(), e).into()),
        }
    }

    fn apply_args(&mut self, args: &ServeArgs) {
        if let Some(interface) = args.interface {
            self.serve.interface = interface;
        }
        if let Some(port) = args.port {
            self.serve.port = port;
        }
        if let Some(watch) = args.watch {
            self.serve.watch = watch;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "[serve] debounce_ms must be greater than 0".into(),
            ));
        }

        let command = self.renderer.command();
        let Some(program) = command.first() else {
            return Err(ConfigError::Validation(
                "[renderer] command must not be empty".into(),
            ));
        };
        if which::which(program).is_err() {
            return Err(ConfigError::Validation(format!(
                "renderer program `{program}` not found in PATH"
            )));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.serve.debounce_ms)
    }
}

#[cfg(test)]
pub fn test_parse_config(content: &str) -> DevConfig {
    DevConfig::from_str(content).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &Path) -> ServeArgs {
        ServeArgs {
            folder: dir.to_path_buf(),
            interface: None,
            port: None,
            watch: None,
            verbose: false,
        }
    }

    /// Config whose renderer is a program present on any unix box.
    fn with_command(command: &[&str]) -> DevConfig {
        let mut config = DevConfig::default();
        config.renderer.command = Some(command.iter().map(|s| s.to_string()).collect());
        config
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = DevConfig::from_str("[serve\nport = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(DevConfig::from_str("[serve]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let mut config = with_command(&["sh"]);
        config.serve.debounce_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("debounce_ms"));
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = with_command(&[]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_missing_program_rejected() {
        let config = with_command(&["s4g-no-such-renderer"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("s4g-no-such-renderer"));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_file_then_cli_overrides() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("_s4g")).unwrap();
        fs::write(
            dir.path().join(CONFIG_PATH),
            "[serve]\nport = 4000\ndebounce_ms = 250\n\n[renderer]\ncommand = [\"cat\"]\n",
        )
        .unwrap();

        let mut cli = args(dir.path());
        cli.port = Some(4001);
        cli.watch = Some(false);
        let config = DevConfig::load(&cli).unwrap();

        assert_eq!(config.serve.port, 4001);
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert!(!config.serve.watch);
        assert_eq!(config.renderer.command(), vec!["cat"]);
        assert_eq!(config.site_dir, normalize_path(dir.path()));
        assert_eq!(config.serve.interface.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_load_missing_folder() {
        let dir = TempDir::new().unwrap();
        let err = DevConfig::load(&args(&dir.path().join("nope"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
