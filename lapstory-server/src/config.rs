//! Server configuration
//!
//! Sources, in order of precedence:
//! 1. Environment overrides (`LAPSTORY_STREAM_URL`, `LAPSTORY_BIND`)
//! 2. JSON config file (`LAPSTORY_CONFIG`, else `<config dir>/lapstory/config.json`)
//! 3. Built-in defaults

use lapstory_stream::{StreamConfig, StreamError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "LAPSTORY_CONFIG";
pub const STREAM_URL_ENV: &str = "LAPSTORY_STREAM_URL";
pub const BIND_ENV: &str = "LAPSTORY_BIND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid bind address {0:?}")]
    InvalidBind(String),

    #[error("stream URL must start with ws:// or wss://, got {0:?}")]
    InvalidStreamUrl(String),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// WebSocket URL of the telemetry source
    pub stream_url: String,

    /// HTTP API listen address
    pub bind_addr: SocketAddr,

    /// Laps kept in the telemetry window
    pub buffer_capacity: usize,

    pub stream: StreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            stream_url: "ws://127.0.0.1:8765/telemetry".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9200)),
            buffer_capacity: lapstory_core::buffer::DEFAULT_CAPACITY,
            stream: StreamConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from file and environment, then validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply env-style overrides from `lookup`
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(STREAM_URL_ENV) {
            self.stream_url = url;
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_addr = bind.parse().map_err(|_| ConfigError::InvalidBind(bind))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.stream_url.starts_with("ws://") || self.stream_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidStreamUrl(self.stream_url.clone()));
        }
        self.stream.validate()?;
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lapstory").join("config.json"))
}
