//! Runtime configuration from `GENBA_*` environment variables.
//!
//! | variable           | default              |
//! |--------------------|----------------------|
//! | `GENBA_DB_PATH`    | `genba.sqlite3`      |
//! | `GENBA_LOG_LEVEL`  | build-mode default   |
//! | `GENBA_LOG_DIR`    | unset (no file logs) |
//! | `GENBA_EXPORT_DIR` | `.`                  |

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const ENV_PREFIX: &str = "GENBA_";

#[derive(Debug)]
pub enum ConfigError {
    Env(envy::Error),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(err) => write!(f, "invalid {ENV_PREFIX}* environment: {err}"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Env(err) => Some(err),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<envy::Error> for ConfigError {
    fn from(value: envy::Error) -> Self {
        Self::Env(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Absolute directory for rotated log files.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_level(),
            log_dir: None,
            export_dir: default_export_dir(),
        }
    }
}

impl CoreConfig {
    /// Loads and validates configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::validated(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// Loads from explicit `(name, value)` pairs, prefix included.
    pub fn from_iter<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::validated(envy::prefixed(ENV_PREFIX).from_iter::<_, Self>(vars)?)
    }

    fn validated(mut config: Self) -> Result<Self, ConfigError> {
        config.log_level = normalize_level(&config.log_level)?.to_string();
        if let Some(log_dir) = &config.log_dir {
            normalize_log_dir(log_dir)?;
        }
        Ok(config)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("genba.sqlite3")
}

fn default_level() -> String {
    default_log_level().to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}
