//! Package-level metadata.
//!
//! A data package descriptor is mostly opaque to this engine. The only subtree
//! it owns is `resources[0].schema.fields`; every other key is kept exactly as
//! loaded, in its original order.

use crate::{ColumnModel, CoreError, Field, Result, Schema};
use serde_json::{Map, Value, json};

const RESOURCES_KEY: &str = "resources";
const SCHEMA_KEY: &str = "schema";
const FIELDS_KEY: &str = "fields";

/// A single-resource data package descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    json: Map<String, Value>,
}

impl PackageMetadata {
    /// Creates a package with no resources.
    pub fn new(name: impl Into<String>) -> Self {
        let mut json = Map::new();
        json.insert("name".to_string(), Value::String(name.into()));
        json.insert(RESOURCES_KEY.to_string(), Value::Array(Vec::new()));
        Self { json }
    }

    /// Creates a package holding one resource whose schema mirrors the columns.
    pub fn for_columns(name: impl Into<String>, columns: &ColumnModel) -> Result<Self> {
        let name = name.into();
        let mut metadata = Self::new(name.clone());
        metadata.add_resource(&name, &Schema::from_column_model(columns))?;
        Ok(metadata)
    }

    /// Wraps a parsed descriptor.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(json) => {
                if let Some(resources) = json.get(RESOURCES_KEY) {
                    if !resources.is_array() {
                        return Err(CoreError::descriptor("'resources' must be an array"));
                    }
                }
                Ok(Self { json })
            }
            other => Err(CoreError::descriptor(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns the descriptor as JSON.
    pub fn to_value(&self) -> Value {
        Value::Object(self.json.clone())
    }

    /// Returns the descriptor as JSON, consuming the metadata.
    pub fn into_value(self) -> Value {
        Value::Object(self.json)
    }

    /// Returns the package name, if set.
    pub fn name(&self) -> Option<&str> {
        self.json.get("name").and_then(Value::as_str)
    }

    /// Returns the number of resources.
    pub fn resource_count(&self) -> usize {
        self.json
            .get(RESOURCES_KEY)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Appends a resource with the given schema.
    pub fn add_resource(&mut self, name: &str, schema: &Schema) -> Result<()> {
        let resource = json!({
            "name": name,
            "profile": "tabular-data-resource",
            "schema": serde_json::to_value(schema)?,
        });
        match self
            .json
            .entry(RESOURCES_KEY)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(resources) => {
                resources.push(resource);
                Ok(())
            }
            _ => Err(CoreError::descriptor("'resources' must be an array")),
        }
    }

    /// Returns true if the first resource carries a schema object.
    pub fn has_schema(&self) -> bool {
        self.first_resource()
            .and_then(|r| r.get(SCHEMA_KEY))
            .is_some_and(Value::is_object)
    }

    /// Extracts the schema of the first resource.
    ///
    /// Returns `Ok(None)` when there is no resource or the resource has no
    /// schema.
    pub fn schema(&self) -> Result<Option<Schema>> {
        match self.first_resource().and_then(|r| r.get(SCHEMA_KEY)) {
            Some(value) => Schema::from_value(value).map(Some),
            None => Ok(None),
        }
    }

    /// Writes a field list into `resources[0].schema.fields`.
    ///
    /// Creates the schema object if the resource has none. All other keys of
    /// the schema and the resource are left as they are.
    pub fn set_schema_fields(&mut self, fields: &[Field]) -> Result<()> {
        let fields = serde_json::to_value(fields)?;
        let resource = self
            .first_resource_mut()
            .ok_or_else(|| CoreError::descriptor("package has no resource"))?;
        let schema = resource
            .entry(SCHEMA_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        match schema {
            Value::Object(schema) => {
                schema.insert(FIELDS_KEY.to_string(), fields);
                Ok(())
            }
            _ => Err(CoreError::descriptor("resource 'schema' must be an object")),
        }
    }

    fn first_resource(&self) -> Option<&Map<String, Value>> {
        self.json
            .get(RESOURCES_KEY)?
            .as_array()?
            .first()?
            .as_object()
    }

    fn first_resource_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.json
            .get_mut(RESOURCES_KEY)?
            .as_array_mut()?
            .first_mut()?
            .as_object_mut()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
