//! Error types for ProcureFlow
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors that reach a stage entry point are structural and abort the
//! orchestrator. Per-object failures are absorbed by the transition engine
//! and per-cell failures never become errors at all.

use thiserror::Error;

/// The main error type for ProcureFlow
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage error on '{key}': {message}")]
    Storage { key: String, message: String },

    // ============================================================================
    // Codec Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Failed to decode payload: {message}")]
    Decode { message: String },

    #[error("Failed to encode payload: {message}")]
    Encode { message: String },

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Schema mismatch: expected [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("Stage '{stage}' is not registered")]
    MissingStage { stage: String },

    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("Event channel closed")]
    EventChannelClosed,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a storage error for a key
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a schema mismatch error from the two column lists
    pub fn schema_mismatch(expected: &[&str], found: &[&str]) -> Self {
        Self::SchemaMismatch {
            expected: expected.join(", "),
            found: found.join(", "),
        }
    }

    /// Create a stage failure
    pub fn stage_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a configuration/precondition problem
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
                | Error::MissingStage { .. }
        )
    }

    /// Check if this error aborts a whole batch rather than a single cell
    ///
    /// Storage and I/O failures count: they are not told apart from an
    /// unreadable payload.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::SchemaMismatch { .. }
                | Error::Decode { .. }
                | Error::Encode { .. }
                | Error::Arrow(_)
                | Error::Parquet(_)
                | Error::Storage { .. }
                | Error::Io(_)
                | Error::FileNotFound { .. }
        ) || self.is_config()
    }
}

/// Result type alias for ProcureFlow
pub type Result<T> = std::result::Result<T, Error>;
