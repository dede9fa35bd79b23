//! # cellcheck core
//!
//! Core data structures for the schema-synchronized cell validation engine.
//!
//! ## Key Concepts
//!
//! - **Dataset**: a column model plus rows of raw cells, optionally carrying
//!   package-level metadata
//! - **Schema**: ordered field descriptors derived from that metadata; it mirrors
//!   the column model and is resynchronized after every structural column change
//! - **Field**: a named, typed column descriptor with optional format and
//!   constraints
//! - **Finding**: one failing cell in an inspection report
//!
//! ## Example
//!
//! ```rust
//! use cellcheck_core::{DatasetBuilder, FieldBuilder, InspectOptions};
//!
//! let dataset = DatasetBuilder::new("1", "gdp")
//!     .columns(["Country Name", "Year"])
//!     .row(["Arab World", "1968"])
//!     .field(
//!         FieldBuilder::new("Year", "integer")
//!             .constraint("minimum", 1962)
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let options = InspectOptions::new().with_columns(["Year"]);
//! assert_eq!(dataset.schema().unwrap().len(), 2);
//! assert_eq!(options.column_names, vec!["Year"]);
//! ```

pub mod builder;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod report;
pub mod schema;

pub use builder::*;
pub use dataset::*;
pub use error::*;
pub use metadata::*;
pub use report::*;
pub use schema::*;
