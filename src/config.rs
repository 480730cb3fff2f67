//! Application configuration.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. environment variables prefixed `LINKDUPE_` (e.g. `LINKDUPE_WORKERS=8`)
//! 4. command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::default_workers;
use crate::scanner::Algorithm;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LINKDUPE_";

/// Configuration loading errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has invalid values.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hash algorithm
    pub algorithm: Algorithm,
    /// Number of hashing workers
    pub workers: usize,
    /// Replace duplicates with hard links
    pub hardlink: bool,
    /// Only report what would be linked
    pub dry_run: bool,
    /// Cancel the scan after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            workers: default_workers(),
            hardlink: false,
            dry_run: false,
            timeout_secs: None,
        }
    }
}

/// Values set on the command line; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardlink: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load all layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file
    /// and [`ConfigError::Invalid`] if any layer fails to parse.
    pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let figment = Self::figment(explicit)?.merge(Serialized::defaults(overrides));
        let config: Self = figment.extract().map_err(Box::new)?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Defaults, file and environment layers, without CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(path) = Self::default_path() {
                    log::trace!("Looking for configuration at {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "linkdupe", "linkdupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The scan timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
