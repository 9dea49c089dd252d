// Configuration module entry point
// Loads, overrides and validates application configuration

mod types;

use std::net::SocketAddr;
use std::ops::RangeInclusive;

pub use types::{AcceptMode, CaptureConfig, Config, HttpConfig, LoggingConfig, ServerConfig};

/// Default configuration file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "camcapture";

/// Ports the control endpoint may listen on
pub const VALID_PORTS: RangeInclusive<u16> = 1025..=65535;

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("port {0} is outside the allowed range 1025-65535")]
    InvalidPort(u16),

    #[error("http.max_body_size must be greater than zero")]
    InvalidBodyLimit,

    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
}

impl Config {
    /// Load configuration from a file path; the extension may be omitted
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("CAMCAPTURE").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.accept_mode", "serial")?
            .set_default("server.connection_timeout", 30)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("capture.folder", "captures")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check values the listener and request reader rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_PORTS.contains(&self.server.port) {
            return Err(ConfigError::InvalidPort(self.server.port));
        }
        if self.http.max_body_size == 0 {
            return Err(ConfigError::InvalidBodyLimit);
        }
        self.get_socket_addr()?;
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}
