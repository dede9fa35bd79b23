//! Schema synchronization with the column model.
//!
//! The column-editing layer calls [`SchemaSynchronizer::on_column_change`] after
//! every structural mutation it commits. The synchronizer rewrites the
//! dataset's field list to match and stores it back into the package metadata.
//! Changes are applied to a copy first; a change that does not fit the current
//! field list leaves the schema exactly as it was.

use crate::{ColumnChange, Result, SyncError};
use cellcheck_core::{Dataset, Field, PackageMetadata, Schema};
use tracing::{debug, info, warn};

/// What a synchronization call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The change was applied; the schema now has `fields` fields
    Applied {
        /// Field count after the change
        fields: usize,
    },
    /// No schema existed; one was derived from the committed column model
    Created {
        /// Field count of the new schema
        fields: usize,
    },
    /// The change was not applied and the schema is untouched
    Skipped(SyncError),
}

/// Keeps a dataset's schema in step with its column model.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaSynchronizer;

impl SchemaSynchronizer {
    /// Creates a new synchronizer.
    pub fn new() -> Self {
        Self
    }

    /// Reacts to a committed column change.
    ///
    /// # Errors
    ///
    /// Only a descriptor that cannot hold a schema is an error. Changes that
    /// cannot be applied are reported as [`SyncOutcome::Skipped`].
    pub fn on_column_change(
        &self,
        dataset: &mut Dataset,
        change: &ColumnChange,
    ) -> Result<SyncOutcome> {
        if let Some(outcome) = self.ensure_schema(dataset)? {
            return Ok(outcome);
        }

        let Some(current) = dataset.schema() else {
            // ensure_schema guarantees a parsed schema here
            return Ok(SyncOutcome::Skipped(SyncError::malformed(
                change.kind(),
                "schema could not be extracted",
            )));
        };

        let mut schema = current.clone();
        if let Err(err) = apply_change(&mut schema, change) {
            warn!(dataset = %dataset.id(), "{}", err);
            return Ok(SyncOutcome::Skipped(err));
        }

        let fields = schema.len();
        if let Some(metadata) = dataset.metadata_mut() {
            metadata.set_schema_fields(&schema.fields)?;
        }
        dataset.refresh_schema();
        debug!(
            dataset = %dataset.id(),
            kind = change.kind(),
            fields,
            "schema synchronized"
        );
        Ok(SyncOutcome::Applied { fields })
    }

    /// Makes sure the dataset has metadata with one resource and a schema.
    ///
    /// Returns `Some(Created)` when a schema had to be derived. That schema
    /// already reflects the committed column model, so the triggering change
    /// must not be applied on top of it.
    fn ensure_schema(&self, dataset: &mut Dataset) -> Result<Option<SyncOutcome>> {
        let derived = Schema::from_column_model(&dataset.columns);
        let fields = derived.len();
        let resource_name = dataset.name().to_string();

        match dataset.metadata_mut() {
            None => {
                let metadata = PackageMetadata::for_columns(resource_name, &dataset.columns)?;
                dataset.attach_metadata(metadata);
            }
            Some(metadata) if metadata.resource_count() == 0 => {
                metadata.add_resource(&resource_name, &derived)?;
                dataset.refresh_schema();
            }
            Some(metadata) if !metadata.has_schema() => {
                metadata.set_schema_fields(&derived.fields)?;
                dataset.refresh_schema();
            }
            Some(metadata) => {
                // Surface a schema that exists but does not parse.
                metadata.schema()?;
                return Ok(None);
            }
        }

        info!(
            dataset = %dataset.id(),
            fields,
            "created schema from column model"
        );
        Ok(Some(SyncOutcome::Created { fields }))
    }
}

/// Applies one change to a field list.
pub fn apply_change(
    schema: &mut Schema,
    change: &ColumnChange,
) -> std::result::Result<(), SyncError> {
    let kind = change.kind();
    match change {
        ColumnChange::Add {
            column_index,
            column_name,
        } => schema
            .insert_field(*column_index, Field::string(column_name.as_str()))
            .map_err(|e| SyncError::malformed(kind, e)),

        ColumnChange::Remove { column_index } => schema
            .remove_field(*column_index)
            .map(|_| ())
            .map_err(|e| SyncError::malformed(kind, e)),

        ColumnChange::Move {
            column_index,
            new_index,
        } => {
            let field = schema
                .remove_field(*column_index)
                .map_err(|e| SyncError::malformed(kind, e))?;
            schema
                .insert_field(*new_index, field)
                .map_err(|e| SyncError::malformed(kind, e))
        }

        ColumnChange::Reorder { column_names } => {
            let fields = column_names
                .iter()
                .map(|name| Field::string(name.as_str()))
                .collect();
            let reordered =
                Schema::from_fields(fields).map_err(|e| SyncError::malformed(kind, e))?;
            schema.fields = reordered.fields;
            Ok(())
        }

        ColumnChange::Split {
            column_index,
            column_names,
            remove_original,
        } => {
            if *column_index >= schema.len() {
                return Err(SyncError::malformed(
                    kind,
                    format!(
                        "origin index {} out of range for schema of length {}",
                        column_index,
                        schema.len()
                    ),
                ));
            }
            for (offset, name) in column_names.iter().enumerate() {
                schema
                    .insert_field(column_index + 1 + offset, Field::string(name.as_str()))
                    .map_err(|e| SyncError::malformed(kind, e))?;
            }
            if *remove_original {
                schema
                    .remove_field(*column_index)
                    .map_err(|e| SyncError::malformed(kind, e))?;
            }
            Ok(())
        }

        ColumnChange::Unknown => Err(SyncError::UnhandledChange(kind.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcheck_core::{DatasetBuilder, FieldBuilder, FieldType};
    use pretty_assertions::assert_eq;

    fn names(dataset: &Dataset) -> Vec<String> {
        dataset
            .schema()
            .unwrap()
            .field_names()
            .map(str::to_string)
            .collect()
    }

    fn abc() -> Dataset {
        DatasetBuilder::new("1", "abc")
            .columns(["A", "B", "C"])
            .field(
                FieldBuilder::new("B", "integer")
                    .constraint("minimum", 0)
                    .build(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_inserts_default_string_field() {
        let mut dataset = abc();
        let change = ColumnChange::Add {
            column_index: 1,
            column_name: "New".to_string(),
        };
        let outcome = SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &change)
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Applied { fields: 4 });
        assert_eq!(names(&dataset), vec!["A", "New", "B", "C"]);
        assert_eq!(dataset.schema().unwrap().fields[1], Field::string("New"));
    }

    #[test]
    fn test_move_keeps_field_metadata() {
        let mut dataset = abc();
        let change = ColumnChange::Move {
            column_index: 1,
            new_index: 2,
        };
        SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &change)
            .unwrap();

        assert_eq!(names(&dataset), vec!["A", "C", "B"]);
        let moved = dataset.schema().unwrap().field("B").unwrap();
        assert_eq!(moved.field_type, FieldType::Integer);
        assert!(moved.constraint("minimum").is_some());
    }

    #[test]
    fn test_split_keeping_original_places_new_fields_after_it() {
        let mut dataset = abc();
        let change = ColumnChange::Split {
            column_index: 1,
            column_names: vec!["B 1".to_string(), "B 2".to_string()],
            remove_original: false,
        };
        SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &change)
            .unwrap();
        assert_eq!(names(&dataset), vec!["A", "B", "B 1", "B 2", "C"]);
    }

    #[test]
    fn test_out_of_range_change_is_skipped() {
        let mut dataset = abc();
        let before = dataset.metadata().cloned();
        let change = ColumnChange::Remove { column_index: 9 };
        let outcome = SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &change)
            .unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::Skipped(SyncError::MalformedChangeRequest { kind: "remove", .. })
        ));
        assert_eq!(dataset.metadata().cloned(), before);
    }

    #[test]
    fn test_failed_split_leaves_schema_untouched() {
        let mut dataset = abc();
        let before = names(&dataset);
        // "C" already exists, so the second insert fails after the first succeeded
        let change = ColumnChange::Split {
            column_index: 0,
            column_names: vec!["A1".to_string(), "C".to_string()],
            remove_original: true,
        };
        let outcome = SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &change)
            .unwrap();

        assert!(matches!(outcome, SyncOutcome::Skipped(_)));
        assert_eq!(names(&dataset), before);
    }

    #[test]
    fn test_unknown_change_is_unhandled() {
        let mut dataset = abc();
        let outcome = SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &ColumnChange::Unknown)
            .unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Skipped(SyncError::UnhandledChange("unknown".to_string()))
        );
    }

    #[test]
    fn test_schema_is_created_lazily_from_columns() {
        let mut dataset = DatasetBuilder::new("7", "fresh")
            .columns(["x", "y", "z"])
            .build()
            .unwrap();
        assert!(dataset.metadata().is_none());

        // The column model already contains "z"; the derived schema must not add it twice.
        let change = ColumnChange::Add {
            column_index: 2,
            column_name: "z".to_string(),
        };
        let outcome = SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &change)
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Created { fields: 3 });
        assert_eq!(names(&dataset), vec!["x", "y", "z"]);
        assert_eq!(dataset.metadata().unwrap().resource_count(), 1);
    }

    #[test]
    fn test_resource_is_added_to_package_without_resources() {
        let mut dataset = DatasetBuilder::new("8", "bare")
            .columns(["x"])
            .build()
            .unwrap();
        dataset.attach_metadata(PackageMetadata::new("bare-package"));

        let outcome = SchemaSynchronizer::new()
            .on_column_change(&mut dataset, &ColumnChange::Remove { column_index: 0 })
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Created { fields: 1 });
        assert_eq!(names(&dataset), vec!["x"]);
    }
}
