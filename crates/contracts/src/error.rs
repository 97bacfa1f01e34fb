//! Layered error definitions
//!
//! Categorized by source: validation / adapter / cache / store / config

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum DispatchError {
    // ===== Validation Errors =====
    /// Malformed dispatch request. The only error that fails a dispatch
    /// call outright; no adapter is invoked once raised.
    #[error("validation error at '{field}': {message}")]
    Validation { field: String, message: String },

    // ===== Adapter Errors =====
    /// Adapter reported a dispatch failure
    #[error("adapter dispatch error for device '{device_id}': {message}")]
    Adapter { device_id: String, message: String },

    /// No adapter registered under the given name
    #[error("no adapter registered under name '{name}'")]
    AdapterNotRegistered { name: String },

    // ===== Collaborator Errors =====
    /// Payload cache error (best-effort, logged by callers)
    #[error("cache error for subject '{subject_id}': {message}")]
    Cache {
        subject_id: String,
        message: String,
    },

    /// Template store error
    #[error("template store error for subject '{subject_id}': {message}")]
    Store {
        subject_id: String,
        message: String,
    },

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

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl DispatchError {
    /// Create validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create adapter dispatch error
    pub fn adapter(device_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            device_id: device_id.into(),
            message: message.into(),
        }
    }

    /// Create cache error
    pub fn cache(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            subject_id: subject_id.into(),
            message: message.into(),
        }
    }

    /// Create template store error
    pub fn store(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            subject_id: subject_id.into(),
            message: message.into(),
        }
    }

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
}
