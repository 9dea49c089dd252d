// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::logger::{AccessLogFormat, LogLevel};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub capture: CaptureConfig,
    pub logging: LoggingConfig,
}

/// How accepted connections are scheduled
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcceptMode {
    /// Serve each connection to completion before accepting the next
    #[default]
    Serial,
    /// Spawn one task per connection
    Concurrent,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub accept_mode: AcceptMode,
    /// Upper bound for serving one connection, in seconds
    pub connection_timeout: u64,
    pub workers: Option<usize>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Root directory for static files; no static fallback when unset
    #[serde(default)]
    pub static_root: Option<String>,
    pub max_body_size: usize,
}

/// Capture storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    /// Directory captures are written to and listed from
    pub folder: String,
    /// Still image handed out as the captured frame
    #[serde(default)]
    pub snapshot_source: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    pub access_log_format: AccessLogFormat,
    /// Info/access log file path (stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
    /// Error log file path (stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}
