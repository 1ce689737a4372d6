//! Core error types for shotclock-core.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for shotclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Audio pipeline errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Audio pipeline errors. All of these are treated as non-fatal by
/// callers: a failed tone never interrupts the countdown.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No default output device, or the stream could not be opened
    #[error("Failed to open audio output: {0}")]
    StreamUnavailable(String),

    /// The audio thread could not be spawned
    #[error("Failed to spawn audio thread: {0}")]
    ThreadSpawn(String),

    /// The audio thread is gone and its command channel is closed
    #[error("Audio command channel closed")]
    ChannelClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown dot-separated config key
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory could not be created
    #[error("Failed to create config directory {path}: {message}")]
    DirUnavailable { path: PathBuf, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
