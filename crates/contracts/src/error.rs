//! Layered error definitions
//!
//! Categorized by source: config / ingestion / session / export

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CoreError {
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

    // ===== Ingestion Errors =====
    /// The ingestion receiver was already taken
    #[error("sample receiver already taken")]
    ReceiverTaken,

    // ===== Session Errors =====
    /// Session consume task ended abnormally
    #[error("session task failed: {message}")]
    SessionTask { message: String },

    // ===== Export Errors =====
    /// CSV write error; the in-memory record is untouched and can be retried
    #[error("export write error at '{path}': {message}")]
    ExportWrite { path: String, message: String },

    /// CSV parse error on re-import
    #[error("export parse error at line {line}: {message}")]
    ExportParse { line: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
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

    /// Create export write error
    pub fn export_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExportWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create export parse error
    pub fn export_parse(line: usize, message: impl Into<String>) -> Self {
        Self::ExportParse {
            line,
            message: message.into(),
        }
    }
}
