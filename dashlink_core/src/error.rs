//! Error types for dashlink
//!
//! Only setup paths return errors: loading configuration, writing the layout
//! file, building the scheduler runtime. The data path (receive, tick, send)
//! degrades by dropping or clipping and never surfaces a `DashError`.

use thiserror::Error;

/// Main error type for dashlink operations
#[derive(Debug, Error)]
pub enum DashError {
    /// Filesystem or socket I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parse failure
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse failure
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Network setup failure
    #[error("Network error: {0}")]
    Network(String),

    /// Widget registration rejected
    #[error("Registration error: {0}")]
    Registration(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashError {
    pub fn config(msg: impl Into<String>) -> Self {
        DashError::Config(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        DashError::Network(msg.into())
    }

    pub fn registration(msg: impl Into<String>) -> Self {
        DashError::Registration(msg.into())
    }
}

/// Result alias used across the crate
pub type DashResult<T> = Result<T, DashError>;
