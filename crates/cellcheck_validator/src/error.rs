//! Error types for inspection and the validation service.

use cellcheck_core::CoreError;
use cellcheck_package::MetadataError;
use thiserror::Error;

/// Recoverable problems found while compiling a check plan.
///
/// None of these abort an inspection: each one is logged, recorded as a
/// report warning, and the affected column or constraint is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectionError {
    /// The dataset has no schema attached
    #[error("No schema attached to dataset '{0}'")]
    SchemaMissing(String),

    /// A constraint name has no registered handler
    #[error("Unknown constraint '{constraint}' on column '{column}'")]
    UnknownConstraint {
        /// Column the constraint is declared on
        column: String,
        /// Constraint name
        constraint: String,
    },

    /// A constraint validator rejected its payload
    #[error("Cannot build '{constraint}' for column '{column}': {reason}")]
    ConstructionError {
        /// Column the constraint is declared on
        column: String,
        /// Constraint name
        constraint: String,
        /// Why the payload was rejected
        reason: String,
    },

    /// A requested column has no field in the schema
    #[error("Column '{0}' has no field in the schema")]
    FieldNotFound(String),

    /// A requested column is not in the column model
    #[error("Column '{0}' not found in the column model")]
    ColumnNotFound(String),
}

impl InspectionError {
    /// Creates a new construction error.
    pub fn construction(
        column: impl Into<String>,
        constraint: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::ConstructionError {
            column: column.into(),
            constraint: constraint.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors of the dataset-level service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No dataset is registered under the id
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),

    /// A column edit was rejected by the column model
    #[error("Column edit rejected: {0}")]
    ColumnEdit(#[from] CoreError),

    /// Metadata could not be read or written
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
