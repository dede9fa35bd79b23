//! Dataset representation: column model, rows and cells.
//!
//! The column model is owned by the dataset and mutated by column editing
//! operations. The attached [`Schema`] is re-derived from package metadata and
//! must be resynchronized after every structural column change.

use crate::{CoreError, PackageMetadata, Result, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// A raw, untyped cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Null/missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl CellValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns true if the value counts as missing: null or empty text.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the textual representation seen by coercion and text checks.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A row/column intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Raw value as written
    pub value: CellValue,

    /// Optional per-cell recorded metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded: Option<Map<String, Value>>,
}

impl Cell {
    /// Creates a cell without recorded metadata.
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            recorded: None,
        }
    }

    /// Returns true if the cell value counts as missing.
    pub fn is_missing(&self) -> bool {
        self.value.is_missing()
    }

    /// Returns the textual representation of the value.
    pub fn text(&self) -> String {
        self.value.to_text()
    }
}

/// A single row; cells are addressed by a column's `cell_index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<Option<Cell>>,
}

impl Row {
    /// Creates a row from values, one per cell index.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            cells: values.into_iter().map(|v| Some(Cell::new(v))).collect(),
        }
    }

    /// Returns the cell at a cell index, if present.
    pub fn cell(&self, cell_index: usize) -> Option<&Cell> {
        self.cells.get(cell_index).and_then(Option::as_ref)
    }

    /// Writes a cell, growing the row as needed.
    pub fn set_cell(&mut self, cell_index: usize, cell: Option<Cell>) {
        if cell_index >= self.cells.len() {
            self.cells.resize(cell_index + 1, None);
        }
        self.cells[cell_index] = cell;
    }

    /// Returns the number of cell slots in this row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cell slots.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A column in the column model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Index of this column's cells inside each row
    pub cell_index: usize,
}

/// Ordered sequence of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnModel {
    columns: Vec<Column>,
    max_cell_index: Option<usize>,
}

impl ColumnModel {
    /// Creates an empty column model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a column model whose cell indices follow column order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut model = Self::new();
        for name in names {
            let index = model.len();
            model.insert_column(index, name)?;
        }
        Ok(model)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Looks up a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Inserts a new column at `index` and allocates a fresh cell index for it.
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if index > self.columns.len() {
            return Err(CoreError::out_of_range(
                "column model",
                index,
                self.columns.len(),
            ));
        }
        if self.column_by_name(&name).is_some() {
            return Err(CoreError::DuplicateColumn(name));
        }
        let cell_index = self.max_cell_index.map_or(0, |max| max + 1);
        self.max_cell_index = Some(cell_index);
        self.columns.insert(index, Column { name, cell_index });
        Ok(cell_index)
    }

    /// Removes and returns the column at `index`. Its cell index is not reused.
    pub fn remove_column(&mut self, index: usize) -> Result<Column> {
        if index >= self.columns.len() {
            return Err(CoreError::out_of_range(
                "column model",
                index,
                self.columns.len(),
            ));
        }
        Ok(self.columns.remove(index))
    }

    /// Moves the column at `from` so that it ends up at `to`.
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.columns.len();
        if from >= len {
            return Err(CoreError::out_of_range("column model", from, len));
        }
        if to >= len {
            return Err(CoreError::out_of_range("column model", to, len));
        }
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        Ok(())
    }

    /// Keeps only the named columns, in the given order.
    pub fn reorder<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut reordered = Vec::with_capacity(names.len());
        for name in names {
            let column = self
                .column_by_name(name.as_ref())
                .ok_or_else(|| CoreError::UnknownColumn(name.as_ref().to_string()))?;
            reordered.push(column.clone());
        }
        self.columns = reordered;
        Ok(())
    }
}

/// A dataset: column model, rows, and optional package metadata.
///
/// Rows are shared behind an [`Arc`] so that a validation run can snapshot them
/// cheaply and hand them to worker tasks.
#[derive(Debug, Clone)]
pub struct Dataset {
    id: String,
    name: String,
    /// Column model, mutated by column editing operations
    pub columns: ColumnModel,
    rows: Arc<Vec<Row>>,
    metadata: Option<PackageMetadata>,
    schema: Option<Schema>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            columns: ColumnModel::new(),
            rows: Arc::new(Vec::new()),
            metadata: None,
            schema: None,
        }
    }

    /// Returns the dataset identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the dataset display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns a shared handle to the current rows.
    pub fn shared_rows(&self) -> Arc<Vec<Row>> {
        Arc::clone(&self.rows)
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Row) {
        Arc::make_mut(&mut self.rows).push(row);
    }

    /// Replaces all rows.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = Arc::new(rows);
    }

    /// Returns the attached package metadata.
    pub fn metadata(&self) -> Option<&PackageMetadata> {
        self.metadata.as_ref()
    }

    /// Returns the attached package metadata for mutation.
    ///
    /// Callers that edit the schema subtree must call [`Dataset::refresh_schema`].
    pub fn metadata_mut(&mut self) -> Option<&mut PackageMetadata> {
        self.metadata.as_mut()
    }

    /// Returns the schema derived from the attached metadata.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Attaches package metadata and extracts its schema.
    ///
    /// A schema that fails to parse is logged and left detached; the metadata
    /// itself is kept.
    pub fn attach_metadata(&mut self, metadata: PackageMetadata) {
        self.metadata = Some(metadata);
        self.refresh_schema();
    }

    /// Detaches and returns the package metadata.
    pub fn detach_metadata(&mut self) -> Option<PackageMetadata> {
        self.schema = None;
        self.metadata.take()
    }

    /// Re-derives the schema from the attached metadata.
    pub fn refresh_schema(&mut self) {
        self.schema = match self.metadata.as_ref().map(PackageMetadata::schema) {
            Some(Ok(schema)) => schema,
            Some(Err(e)) => {
                error!(dataset = %self.id, "extract schema failed: {}", e);
                None
            }
            None => None,
        };
    }
}
