//! # Store Error Types
//!
//! Error types for loading settings, cost configs and order files.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io / serde_json / toml errors                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the offending path                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow::Error (in the CLI) ← Printed with context, exit status 1      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading engine inputs from disk.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // File Errors
    // =========================================================================
    /// File could not be read.
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Cost config or order file is not valid JSON for its schema.
    #[error("Failed to parse {path}: {message}")]
    Json { path: PathBuf, message: String },

    /// Settings file is not valid TOML.
    #[error("Failed to parse settings {path}: {message}")]
    Toml { path: PathBuf, message: String },

    // =========================================================================
    // Content Errors
    // =========================================================================
    /// Strict mode refused a snapshot that failed validation.
    ///
    /// The previously installed snapshot stays active.
    #[error("Cost config rejected: {}", errors.join("; "))]
    InvalidConfig { errors: Vec<String> },

    /// Engine settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// `reload` was called on a store that was never loaded from a file.
    #[error("No source file to reload from")]
    NoSourcePath,
}

impl StoreError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn json(path: &Path, err: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn toml(path: &Path, err: toml::de::Error) -> Self {
        StoreError::Toml {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
