//! Table schema types.
//!
//! A [`Schema`] is the ordered list of [`Field`] descriptors for a dataset's
//! columns. It is a derived view of the column model: order and names always
//! follow the columns, never the other way round.

use crate::{ColumnModel, CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared type of a field.
///
/// Names follow the table-schema vocabulary. Any type name this engine does not
/// know is kept verbatim in [`FieldType::Other`] and round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Free text
    #[default]
    String,
    /// Signed whole number
    Integer,
    /// Floating point number
    Number,
    /// true/false
    Boolean,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time
    DateTime,
    /// Calendar year
    Year,
    /// JSON object
    Object,
    /// JSON array
    Array,
    /// Any value
    Any,
    /// Unrecognized type name
    Other(String),
}

impl FieldType {
    /// Returns the table-schema name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::Year => "year",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
            FieldType::Other(name) => name,
        }
    }

    /// Returns true if values of this type have a natural ordering usable by
    /// minimum/maximum bounds.
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::Integer
                | FieldType::Number
                | FieldType::Date
                | FieldType::Time
                | FieldType::DateTime
                | FieldType::Year
        )
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "string" => FieldType::String,
            "integer" => FieldType::Integer,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime" => FieldType::DateTime,
            "year" => FieldType::Year,
            "object" => FieldType::Object,
            "array" => FieldType::Array,
            "any" => FieldType::Any,
            _ => FieldType::Other(name),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::from(name.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field descriptor in a schema.
///
/// Constraints keep their declaration order; the inspector compiles validators
/// in exactly that order. Keys this engine does not own (`title`,
/// `description`, ...) are carried in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, equal to the column name
    pub name: String,

    /// Declared type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Optional format qualifier (e.g. "email", "%d/%m/%Y")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Constraint name to payload, in declaration order
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub constraints: Map<String, Value>,

    /// Descriptor keys not interpreted by the engine
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Field {
    /// Creates an unconstrained field with the given type and no format.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            format: None,
            constraints: Map::new(),
            extra: Map::new(),
        }
    }

    /// Creates the default field used for new columns: untyped text.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Returns the format, treating an absent format as "default".
    pub fn format_or_default(&self) -> &str {
        self.format.as_deref().unwrap_or("default")
    }

    /// Returns the payload of a constraint, if declared.
    pub fn constraint(&self, name: &str) -> Option<&Value> {
        self.constraints.get(name)
    }

    /// Returns true if any constraint is declared.
    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }
}

/// Ordered collection of fields describing a dataset's columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Field descriptors in column order
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Schema keys not owned by the engine (`primaryKey`, `missingValues`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema from fields, rejecting duplicate names.
    pub fn from_fields(fields: Vec<Field>) -> Result<Self> {
        let schema = Self {
            fields,
            extra: Map::new(),
        };
        schema.check_unique_names()?;
        Ok(schema)
    }

    /// Derives an all-string schema from a column model.
    pub fn from_column_model(columns: &ColumnModel) -> Self {
        Self {
            fields: columns.names().map(Field::string).collect(),
            extra: Map::new(),
        }
    }

    /// Parses a schema from its JSON representation.
    pub fn from_value(value: &Value) -> Result<Self> {
        let schema: Schema = serde_json::from_value(value.clone())?;
        schema.check_unique_names()?;
        Ok(schema)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a field by name for mutation.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Returns the position of a field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Inserts a field at `index`, shifting later fields right.
    pub fn insert_field(&mut self, index: usize, field: Field) -> Result<()> {
        if index > self.fields.len() {
            return Err(CoreError::out_of_range("schema", index, self.fields.len()));
        }
        if self.field(&field.name).is_some() {
            return Err(CoreError::DuplicateField(field.name));
        }
        self.fields.insert(index, field);
        Ok(())
    }

    /// Removes and returns the field at `index`.
    pub fn remove_field(&mut self, index: usize) -> Result<Field> {
        if index >= self.fields.len() {
            return Err(CoreError::out_of_range("schema", index, self.fields.len()));
        }
        Ok(self.fields.remove(index))
    }

    /// Serializes the field list to its persisted JSON form.
    pub fn fields_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.fields)?)
    }

    fn check_unique_names(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::DuplicateField(field.name.clone()));
            }
        }
        Ok(())
    }
}
