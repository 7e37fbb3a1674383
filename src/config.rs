use std::{net::SocketAddr, path::PathBuf};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8051;
pub const DEFAULT_DATA_PATH: &str = "data/timeline_data.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {source}")]
    InvalidPort {
        key: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
    #[error("invalid bind address {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    /// Consolidated JSON written by `process`.
    pub data_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl Settings {
    /// Defaults overridden by `lookup`, which stands in for the process
    /// environment in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(v) = lookup("BIND_ADDR") {
            settings.bind_addr = v;
        }
        if let Some(v) = lookup("PORT") {
            settings.port = v.trim().parse().map_err(|source| ConfigError::InvalidPort {
                key: "PORT",
                value: v.clone(),
                source,
            })?;
        }
        if let Some(v) = lookup("TIMELINE_DATA") {
            settings.data_path = PathBuf::from(v);
        }

        Ok(settings)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddr { addr, source })
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    Settings::from_lookup(|key| std::env::var(key).ok())
}
