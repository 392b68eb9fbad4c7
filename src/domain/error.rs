//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 15s, 1m, 1m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when a string is not a Bluetooth MAC address
#[derive(Debug, Clone, Error)]
#[error("Invalid MAC address: \"{input}\". Expected six hex pairs separated by ':' or '_' (e.g., AA:BB:CC:DD:EE:FF)")]
pub struct MacParseError {
    pub input: String,
}

/// Error when a volume value is out of range
#[derive(Debug, Clone, Error)]
#[error("Invalid volume: {value}. Expected a value between 0 and {max}")]
pub struct VolumeError {
    pub value: f64,
    pub max: f64,
}

/// Error when an unknown discovery mode is configured
#[derive(Debug, Clone, Error)]
#[error("Invalid discovery mode: \"{input}\". Valid modes are: streaming, snapshot")]
pub struct InvalidDiscoveryModeError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
