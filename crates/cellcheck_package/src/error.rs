//! Error types for metadata persistence and schema synchronization.

use cellcheck_core::CoreError;
use thiserror::Error;

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Errors reading or writing package metadata.
///
/// These are the only failures of this crate callers must treat as fatal: the
/// metadata store could not be read or written.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// YAML parsing or serialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON parsing or serialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Descriptor shape is invalid
    #[error("Invalid descriptor: {0}")]
    DescriptorError(#[from] CoreError),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Dataset id cannot name a directory inside the store root
    #[error("Invalid dataset id: {0:?}")]
    InvalidDatasetId(String),
}

/// Recoverable synchronization failures.
///
/// The schema is a derived view, so these never propagate as faults: the
/// synchronizer logs them and leaves the schema untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The change cannot be applied to the current field list
    #[error("Malformed {kind} change: {reason}")]
    MalformedChangeRequest {
        /// Change kind
        kind: &'static str,
        /// Why it could not be applied
        reason: String,
    },

    /// The change kind is not handled by the synchronizer
    #[error("Unhandled column change: {0}")]
    UnhandledChange(String),
}

impl SyncError {
    /// Creates a new malformed change error.
    pub fn malformed(kind: &'static str, reason: impl ToString) -> Self {
        Self::MalformedChangeRequest {
            kind,
            reason: reason.to_string(),
        }
    }
}
