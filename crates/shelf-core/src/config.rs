//! Configuration for shelf
//!
//! Settings live in a TOML file (by default `<config dir>/shelf/config.toml`).
//! The remote connection string is a secret and never part of that file: it
//! comes from the `SHELF_DATABASE` environment variable, or from `DATABASE`
//! in a `secrets.toml` next to the config file.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::file_store::DEFAULT_LIBRARY_FILE;

/// Environment variable holding the remote connection string.
pub const CONNECTION_ENV: &str = "SHELF_DATABASE";

/// Secrets file looked up next to the config file.
pub const SECRETS_FILE: &str = "secrets.toml";

const SECRET_KEY: &str = "DATABASE";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Local library file used in file mode and as the fallback
    pub library_file: PathBuf,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Remote store settings
    pub remote: RemoteConfig,
    #[serde(skip)]
    secrets_file: Option<PathBuf>,
    #[serde(skip)]
    ignore_env: bool,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            library_file: PathBuf::from(DEFAULT_LIBRARY_FILE),
            log_level: "info".to_string(),
            remote: RemoteConfig::default(),
            secrets_file: None,
            ignore_env: false,
        }
    }
}

/// Remote document store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub database: String,
    pub collection: String,
    /// Cluster name sent with every request; the connection string may override it
    pub data_source: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            database: "personal_library".to_string(),
            collection: "books".to_string(),
            data_source: "Cluster0".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ShelfConfig {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shelf").join("config.toml"))
    }

    /// Load from `path`, or from [`Self::default_path`] when `None`.
    ///
    /// A missing file yields defaults. An explicitly named file that cannot
    /// be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let mut config = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).map_err(|message| ConfigError::Parse {
                path: path.clone(),
                message,
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound && !explicit => Self::default(),
            Err(err) => {
                return Err(ConfigError::Io {
                    path,
                    message: err.to_string(),
                })
            }
        };

        config.secrets_file = path.parent().map(|dir| dir.join(SECRETS_FILE));
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|err| err.to_string())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.database.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "remote.database must not be empty".to_string(),
            ));
        }
        if self.remote.collection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "remote.collection must not be empty".to_string(),
            ));
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "remote.timeout_secs must be positive".to_string(),
            ));
        }
        if self.library_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "library_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Point the secrets lookup at a specific file.
    pub fn with_secrets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_file = Some(path.into());
        self
    }

    /// Resolve the secret from the secrets file alone, ignoring
    /// [`CONNECTION_ENV`].
    pub fn ignore_env_secret(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// The remote connection string, if one is configured.
    pub fn connection_secret(&self) -> Result<Option<String>, ConfigError> {
        let env_value = if self.ignore_env {
            None
        } else {
            std::env::var(CONNECTION_ENV).ok()
        };
        resolve_secret(env_value, self.secrets_file.as_deref())
    }
}

fn resolve_secret(
    env_value: Option<String>,
    secrets_file: Option<&Path>,
) -> Result<Option<String>, ConfigError> {
    if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
        return Ok(Some(value));
    }

    let Some(path) = secrets_file else {
        return Ok(None);
    };
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
    };

    let secrets: HashMap<String, toml::Value> =
        toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    Ok(secrets
        .get(SECRET_KEY)
        .and_then(toml::Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string))
}
