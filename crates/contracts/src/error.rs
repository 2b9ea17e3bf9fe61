//! Layered error definitions
//!
//! Categorized by source: config / schema / document / plugin / model

use thiserror::Error;

/// Unified contract error
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Schema Errors =====
    /// Field already defined
    #[error("field '{name}' already exists in schema")]
    DuplicateField { name: String },

    /// Field lookup failed
    #[error("field '{name}' not found in schema")]
    FieldNotFound { name: String },

    /// Field exists but with a different type
    #[error("field '{name}' has type {actual:?}, expected {expected:?}")]
    FieldTypeMismatch {
        name: String,
        expected: crate::FieldKind,
        actual: crate::FieldKind,
    },

    /// Alias chain loops back on itself
    #[error("alias cycle detected while resolving '{name}'")]
    AliasCycle { name: String },

    // ===== Document Errors =====
    /// Interchange document does not match the schema
    #[error("document error for record {record_id}: {message}")]
    Document { record_id: u64, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create field-not-found error
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    /// Create document error
    pub fn document(record_id: u64, message: impl Into<String>) -> Self {
        Self::Document {
            record_id,
            message: message.into(),
        }
    }
}

/// Expected, per-unit measurement failure
///
/// Carries the name of the flag the failing plugin should set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("measurement error [{flag}]: {message}")]
pub struct MeasurementError {
    pub flag: String,
    pub message: String,
}

impl MeasurementError {
    pub fn new(flag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            message: message.into(),
        }
    }
}

/// Error raised by a plugin `calculate` call
#[derive(Debug, Error)]
pub enum PluginError {
    /// Allocation failure; always aborts the run
    #[error("out of memory: {message}")]
    OutOfMemory { message: String },

    /// Internal algorithm failure; always aborts the run
    #[error("fatal algorithm error: {message}")]
    FatalAlgorithm { message: String },

    /// Recoverable per-record failure, delegated to the plugin's `fail`
    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    /// Anything else; logged and skipped
    #[error("{0}")]
    Other(String),
}

impl PluginError {
    /// Create fatal algorithm error
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::FatalAlgorithm {
            message: message.into(),
        }
    }

    /// Create measurement error
    pub fn measurement(flag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Measurement(MeasurementError::new(flag, message))
    }

    /// Create unclassified error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Fatal errors are never recovered
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. } | Self::FatalAlgorithm { .. })
    }
}

/// Position outside a model's valid region
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("point ({x}, {y}) is outside the model domain")]
pub struct DomainError {
    pub x: f64,
    pub y: f64,
}
