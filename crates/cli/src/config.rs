//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use wastetrack_inventory::{FileStorage, StorageError, TransitionPolicy};
use wastetrack_observability::LogFormat;
use wastetrack_registration::Cluster;

pub const ENV_DATA_DIR: &str = "WASTETRACK_DATA_DIR";
pub const ENV_TRANSITIONS: &str = "WASTETRACK_TRANSITIONS";
pub const ENV_MINT_TIMEOUT_SECS: &str = "WASTETRACK_MINT_TIMEOUT_SECS";
pub const ENV_CLUSTER: &str = "WASTETRACK_CLUSTER";
pub const ENV_LOG_FORMAT: &str = "WASTETRACK_LOG_FORMAT";

const DEFAULT_MINT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub transitions: TransitionPolicy,
    pub mint_timeout: Duration,
    pub cluster: Cluster,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset or blank variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let data_dir = match get(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => FileStorage::default_dir()?,
        };

        let transitions = parse_or_default(get(ENV_TRANSITIONS), ENV_TRANSITIONS)?;
        let cluster = parse_or_default(get(ENV_CLUSTER), ENV_CLUSTER)?;
        let log_format = parse_or_default(get(ENV_LOG_FORMAT), ENV_LOG_FORMAT)?;

        let mint_timeout_secs = match get(ENV_MINT_TIMEOUT_SECS) {
            None => DEFAULT_MINT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ENV_MINT_TIMEOUT_SECS,
                        reason: format!("expected a positive number of seconds, got {raw:?}"),
                    });
                }
            },
        };

        Ok(Self {
            data_dir,
            transitions,
            mint_timeout: Duration::from_secs(mint_timeout_secs),
            cluster,
            log_format,
        })
    }
}

fn parse_or_default<T>(raw: Option<String>, var: &'static str) -> Result<T, ConfigError>
where
    T: core::str::FromStr + Default,
    T::Err: ToString,
{
    match raw {
        None => Ok(T::default()),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}
