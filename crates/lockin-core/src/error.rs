//! Core error types for lockin-core.
//!
//! This module defines the error hierarchy used across the library.
//! External service failures and store failures are kept in separate
//! enums because they follow different recovery paths: a service
//! failure becomes an error-labeled observation and the cycle
//! continues, while a store write failure fails the cycle outright.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lockin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// External service errors (description, generation, notification)
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Observation/schedule store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Integration-related errors
    #[error("Integration error for '{service}': {message}")]
    Integration { service: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from external services (description, text generation,
/// screen capture, notification).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Service unreachable, timed out, or returned a failure status
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Service responded, but the response could not be interpreted
    /// (no JSON object found, unparseable JSON, empty text)
    #[error("Malformed service output: {0}")]
    MalformedOutput(String),

    /// A required input to the service call was empty
    #[error("Empty input: {0}")]
    EmptyInput(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::MalformedOutput(err.to_string())
        } else {
            // Timeouts, connection failures, and status errors all mean
            // the service cannot serve this request right now.
            ServiceError::Unavailable(err.to_string())
        }
    }
}

/// Observation/schedule store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create or open the store directory
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a persisted unit
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to enumerate persisted units
    #[error("Failed to read store directory {path}: {source}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a record for persistence
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Config directory could not be resolved or created
    #[error("Failed to resolve config directory: {0}")]
    DirUnavailable(String),
}
