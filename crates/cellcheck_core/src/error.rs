//! Error types for the cellcheck data model.
//!
//! These cover structural problems in schemas, column models and package
//! metadata. Validation failures of individual cells are never errors; they are
//! reported as [`Finding`](crate::Finding)s.

use thiserror::Error;

/// Result type for data model operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for data model operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Two fields in one schema share a name
    #[error("Duplicate field name in schema: '{0}'")]
    DuplicateField(String),

    /// Two columns in one column model share a name
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// A positional index fell outside the sequence it addresses
    #[error("Index {index} out of range for {target} of length {len}")]
    IndexOutOfRange {
        /// What was being indexed ("schema", "column model")
        target: &'static str,
        /// Offending index
        index: usize,
        /// Length of the sequence
        len: usize,
    },

    /// A column name did not resolve in the column model
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// The package descriptor does not have the expected shape
    #[error("Invalid package descriptor: {0}")]
    InvalidDescriptor(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a new index-out-of-range error.
    pub fn out_of_range(target: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { target, index, len }
    }

    /// Creates a new invalid descriptor error.
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor(message.into())
    }
}
