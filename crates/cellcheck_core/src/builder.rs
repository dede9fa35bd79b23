//! Builder pattern for creating fields and datasets.
//!
//! This module provides ergonomic builders for constructing schemas and
//! in-memory datasets with a fluent API.

use crate::{CellValue, ColumnModel, Dataset, Field, FieldType, PackageMetadata, Result, Row};
use serde_json::{Map, Value};

/// Builder for creating a `Field`.
///
/// # Example
///
/// ```rust
/// use cellcheck_core::FieldBuilder;
///
/// let field = FieldBuilder::new("Year", "integer")
///     .description("Observation year")
///     .constraint("minimum", 1962)
///     .build();
///
/// assert_eq!(field.constraint("minimum"), Some(&serde_json::json!(1962)));
/// ```
#[derive(Debug)]
pub struct FieldBuilder {
    name: String,
    field_type: FieldType,
    format: Option<String>,
    constraints: Map<String, Value>,
    extra: Map<String, Value>,
}

impl FieldBuilder {
    /// Creates a new field builder.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name
    /// * `field_type` - Field type (e.g., "string", "integer")
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            format: None,
            constraints: Map::new(),
            extra: Map::new(),
        }
    }

    /// Sets the field format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the field title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.extra
            .insert("title".to_string(), Value::String(title.into()));
        self
    }

    /// Sets the field description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.extra
            .insert("description".to_string(), Value::String(description.into()));
        self
    }

    /// Adds a constraint; later calls keep declaration order.
    pub fn constraint(mut self, name: impl Into<String>, payload: impl Into<Value>) -> Self {
        self.constraints.insert(name.into(), payload.into());
        self
    }

    /// Builds the field.
    pub fn build(self) -> Field {
        Field {
            name: self.name,
            field_type: self.field_type,
            format: self.format,
            constraints: self.constraints,
            extra: self.extra,
        }
    }
}

/// Builder for creating an in-memory `Dataset`.
///
/// Columns get cell indices in declaration order. If any field is declared,
/// the dataset is given package metadata with one resource; columns without a
/// declared field get a default `string` field.
///
/// # Example
///
/// ```rust
/// use cellcheck_core::{DatasetBuilder, FieldBuilder};
///
/// let dataset = DatasetBuilder::new("1", "gdp")
///     .columns(["Country", "Year"])
///     .row(["Arab World", "1968"])
///     .field(FieldBuilder::new("Year", "integer").build())
///     .build()
///     .unwrap();
///
/// assert_eq!(dataset.len(), 1);
/// assert!(dataset.schema().is_some());
/// ```
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    id: String,
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    fields: Vec<Field>,
}

impl DatasetBuilder {
    /// Creates a new dataset builder.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Adds multiple columns.
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a row; values map to columns by position.
    pub fn row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.rows.push(Row::from_values(values));
        self
    }

    /// Adds a prebuilt row.
    pub fn raw_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Declares the field for a column.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the dataset.
    pub fn build(self) -> Result<Dataset> {
        let columns = ColumnModel::from_names(self.columns)?;
        let mut dataset = Dataset::new(self.id, self.name);

        if !self.fields.is_empty() {
            let mut metadata = PackageMetadata::for_columns(dataset.name(), &columns)?;
            let fields: Vec<Field> = columns
                .names()
                .map(|name| {
                    self.fields
                        .iter()
                        .find(|f| f.name == name)
                        .cloned()
                        .unwrap_or_else(|| Field::string(name))
                })
                .collect();
            metadata.set_schema_fields(&fields)?;
            dataset.columns = columns;
            dataset.attach_metadata(metadata);
        } else {
            dataset.columns = columns;
        }

        dataset.set_rows(self.rows);
        Ok(dataset)
    }
}
