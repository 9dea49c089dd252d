//! Logger module
//!
//! Provides the `Logger` collaborator handed to every component that logs:
//! - Leveled server messages (debug, info, warn, error)
//! - Access logging with multiple formats
//! - File-based logging support
//!
//! There is no global instance. `main` builds one `Logger` from the logging
//! configuration and shares it as `Arc<Logger>`.

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::LoggingConfig;
use chrono::Local;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use writer::{LogTarget, LogWriter};

/// Message severity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("Unknown log level: {other}")),
        }
    }
}

/// Leveled logger with separate info and error outputs
pub struct Logger {
    level: LogLevel,
    access_log: bool,
    access_log_format: AccessLogFormat,
    writer: LogWriter,
}

impl Logger {
    /// Build a logger from configuration, opening log files if configured
    pub fn from_config(config: &LoggingConfig) -> std::io::Result<Self> {
        let writer = LogWriter::new(
            LogTarget::file_or(config.log_file.as_deref(), LogTarget::Stdout)?,
            LogTarget::file_or(config.error_log_file.as_deref(), LogTarget::Stderr)?,
        );
        Ok(Self {
            level: config.level,
            access_log: config.access_log,
            access_log_format: config.access_log_format,
            writer,
        })
    }

    /// Logger that drops every message
    pub const fn discard() -> Self {
        Self {
            level: LogLevel::Error,
            access_log: false,
            access_log_format: AccessLogFormat::Combined,
            writer: LogWriter::new(LogTarget::Discard, LogTarget::Discard),
        }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn write(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let line = format!("{} [{level}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        if level >= LogLevel::Warn {
            self.writer.write_error(&line);
        } else {
            self.writer.write_info(&line);
        }
    }

    pub fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }

    /// Log a formatted access log entry
    pub fn access(&self, entry: &AccessLogEntry) {
        if self.access_log {
            self.writer.write_info(&entry.format(self.access_log_format));
        }
    }

    pub fn log_server_start(&self, addr: &SocketAddr, static_root: Option<&str>) {
        self.info("======================================");
        self.info("Capture server started");
        self.info(&format!("Listening on: http://{addr}"));
        match static_root {
            Some(root) => self.info(&format!("Static root: {root}")),
            None => self.info("Static file serving disabled"),
        }
        self.info("======================================");
    }

    pub fn log_connection_error(&self, err: &impl fmt::Debug) {
        self.error(&format!("Failed to serve connection: {err:?}"));
    }
}
