//! # cellcheck package
//!
//! Data package descriptors and the synchronization of their schema with a
//! dataset's column model.
//!
//! - [`parser`] reads and writes descriptors in JSON or YAML
//! - [`SchemaSynchronizer`] applies [`ColumnChange`] notifications to the schema
//! - [`MetadataStore`] persists descriptors per dataset
//!
//! ```rust
//! use cellcheck_core::DatasetBuilder;
//! use cellcheck_package::{ColumnChange, SchemaSynchronizer, SyncOutcome};
//!
//! let mut dataset = DatasetBuilder::new("1", "people")
//!     .columns(["A", "Name", "C"])
//!     .build()
//!     .unwrap();
//! let sync = SchemaSynchronizer::new();
//!
//! // First change: no schema yet, one is derived from the columns.
//! let created = sync
//!     .on_column_change(&mut dataset, &ColumnChange::Unknown)
//!     .unwrap();
//! assert_eq!(created, SyncOutcome::Created { fields: 3 });
//!
//! let split = ColumnChange::Split {
//!     column_index: 1,
//!     column_names: vec!["First".into(), "Last".into()],
//!     remove_original: true,
//! };
//! sync.on_column_change(&mut dataset, &split).unwrap();
//!
//! let names: Vec<_> = dataset.schema().unwrap().field_names().collect();
//! assert_eq!(names, vec!["A", "First", "Last", "C"]);
//! ```

pub mod change;
pub mod error;
pub mod parser;
pub mod store;
pub mod sync;

pub use change::ColumnChange;
pub use error::{MetadataError, Result, SyncError};
pub use parser::{
    DescriptorFormat, detect_format, parse_file, parse_json, parse_yaml, write_file,
};
pub use store::{DESCRIPTOR_FILE, FileMetadataStore, InMemoryMetadataStore, MetadataStore};
pub use sync::{SchemaSynchronizer, SyncOutcome, apply_change};
