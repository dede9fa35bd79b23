//! # cellcheck validator
//!
//! Cell validation engine for datasets with a table schema:
//!
//! - [`coerce`] and [`ValueCoercer`] read raw cell text as typed values
//! - [`ConstraintRegistry`] maps constraint names to validator constructors
//! - [`checks`] holds the validator family, one validator per (column, constraint)
//! - [`ValidationInspector`] compiles and runs check plans
//! - [`ValidationService`] serializes inspections and schema changes per dataset
//!
//! ## Example
//!
//! ```rust
//! use cellcheck_core::{DatasetBuilder, FieldBuilder, InspectOptions};
//! use cellcheck_validator::ValidationInspector;
//!
//! let dataset = DatasetBuilder::new("1", "gdp")
//!     .columns(["Year"])
//!     .row(["1960"])
//!     .row(["1965"])
//!     .row(["abc"])
//!     .field(
//!         FieldBuilder::new("Year", "integer")
//!             .constraint("minimum", 1962)
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let options = InspectOptions::new().with_columns(["Year"]);
//! let report = ValidationInspector::new().inspect(&dataset, &options);
//!
//! let failing: Vec<_> = report.findings.iter().map(|f| (f.row, f.code.as_str())).collect();
//! assert_eq!(failing, vec![(2, "type-or-format-error"), (0, "minimum-constraint")]);
//! ```

pub mod checks;
mod coercer;
mod error;
mod inspector;
mod registry;
mod service;

pub use checks::{CellValidator, ColumnTarget, ConstraintContext, ValidationPass};
pub use coercer::{CoercionError, TypedValue, ValueCoercer, coerce};
pub use error::{InspectionError, ServiceError};
pub use inspector::{CheckPlan, ColumnPlan, ValidationInspector};
pub use registry::{ConstraintRegistry, ValidatorConstructor};
pub use service::ValidationService;
