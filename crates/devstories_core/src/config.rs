//! Store configuration from environment-style key lookups.
//!
//! # Responsibility
//! - Decide remote-vs-fallback mode and the remote base URL.
//! - Locate durable fallback storage.
//!
//! # Invariants
//! - Parsing never reads process state directly; callers inject the lookup.
//! - `api_url` never ends with `/`.

use crate::api::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_USE_API: &str = "DEVSTORIES_USE_API";
pub const ENV_API_URL: &str = "DEVSTORIES_API_URL";
pub const ENV_STORAGE_PATH: &str = "DEVSTORIES_STORAGE_PATH";

/// Resolved store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Remote mode when `true`, fallback mode otherwise.
    pub use_api: bool,
    pub api_url: String,
    /// SQLite file for fallback storage; `None` keeps entries in memory.
    pub storage_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            use_api: false,
            api_url: DEFAULT_API_URL.to_string(),
            storage_path: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Configuration rejected during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyApiUrl,
    RelativeStoragePath(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyApiUrl => write!(f, "{ENV_API_URL} must not be empty in remote mode"),
            Self::RelativeStoragePath(path) => write!(
                f,
                "{ENV_STORAGE_PATH} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    /// - `EmptyApiUrl` when remote mode is on and the URL is blank.
    /// - `RelativeStoragePath` when the storage path is not absolute.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let use_api = lookup(ENV_USE_API).is_some_and(|value| parse_flag(&value));

        let api_url = match lookup(ENV_API_URL) {
            Some(value) => value.trim().trim_end_matches('/').to_string(),
            None => DEFAULT_API_URL.to_string(),
        };
        if use_api && api_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        let storage_path = match lookup(ENV_STORAGE_PATH) {
            Some(value) if !value.trim().is_empty() => {
                let path = Path::new(value.trim()).to_path_buf();
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeStoragePath(path));
                }
                Some(path)
            }
            _ => None,
        };

        Ok(Self {
            use_api,
            api_url,
            storage_path,
            request_timeout: DEFAULT_TIMEOUT,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
