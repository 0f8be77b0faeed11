//! Error types for portwatch.

use thiserror::Error;

/// Errors raised by a capture backend or a single capture session.
///
/// All of these are local to one interface: the worker that hits one logs it
/// and stops, its siblings keep running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("failed to list network devices: {0}")]
    Enumeration(String),

    #[error("couldn't open {interface}: {reason}")]
    Open { interface: String, reason: String },

    #[error("error setting filter '{expression}' on {interface}: {reason}")]
    Filter {
        interface: String,
        expression: String,
        reason: String,
    },

    #[error("read error on {interface}: {reason}")]
    Read { interface: String, reason: String },

    #[error("insufficient permissions to capture on {0} (need root or CAP_NET_RAW)")]
    InsufficientPermissions(String),
}

/// Errors in the startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("watched port list is empty")]
    NoPorts,

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Run-level errors. Either of these means nothing can be monitored.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("error finding devices: {0}")]
    EnumerationFailure(String),

    #[error("no network interfaces found")]
    NoInterfacesFound,
}
