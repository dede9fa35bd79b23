//! Reading and writing data package descriptors (JSON/YAML formats).
//!
//! # Example
//!
//! ```rust
//! use cellcheck_package::parse_yaml;
//!
//! let yaml = r#"
//! name: gdp
//! resources:
//!   - name: gdp
//!     path: data/gdp.csv
//!     schema:
//!       fields:
//!         - name: Year
//!           type: integer
//!           constraints:
//!             minimum: 1962
//! "#;
//!
//! let metadata = parse_yaml(yaml).expect("Failed to parse descriptor");
//! let schema = metadata.schema().unwrap().unwrap();
//! assert_eq!(schema.fields[0].name, "Year");
//! ```

use crate::{MetadataError, Result};
use cellcheck_core::PackageMetadata;
use serde_json::Value;
use std::path::Path;

/// Supported descriptor file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yml, .yaml)
    Yaml,
}

/// Parse a descriptor from a JSON string.
pub fn parse_json(content: &str) -> Result<PackageMetadata> {
    let value: Value = serde_json::from_str(content)?;
    Ok(PackageMetadata::from_value(value)?)
}

/// Parse a descriptor from a YAML string.
pub fn parse_yaml(content: &str) -> Result<PackageMetadata> {
    let value: Value = serde_yaml_ng::from_str(content)?;
    Ok(PackageMetadata::from_value(value)?)
}

/// Detect the descriptor format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.json` → `DescriptorFormat::Json`
/// * `.yaml`, `.yml` → `DescriptorFormat::Yaml`
///
/// # Errors
///
/// Returns `MetadataError::InvalidExtension` if the file has no extension.
/// Returns `MetadataError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<DescriptorFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(MetadataError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "json" => Ok(DescriptorFormat::Json),
        "yaml" | "yml" => Ok(DescriptorFormat::Yaml),
        other => Err(MetadataError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a descriptor from a file with automatic format detection.
///
/// ```no_run
/// use cellcheck_package::parse_file;
/// use std::path::Path;
///
/// let metadata = parse_file(Path::new("gdp/datapackage.json")).unwrap();
/// println!("Loaded package: {:?}", metadata.name());
/// ```
pub fn parse_file(path: &Path) -> Result<PackageMetadata> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        DescriptorFormat::Json => parse_json(&content),
        DescriptorFormat::Yaml => parse_yaml(&content),
    }
}

/// Render a descriptor in the given format.
pub fn to_string(metadata: &PackageMetadata, format: DescriptorFormat) -> Result<String> {
    let value = metadata.to_value();
    match format {
        DescriptorFormat::Json => Ok(serde_json::to_string_pretty(&value)?),
        DescriptorFormat::Yaml => Ok(serde_yaml_ng::to_string(&value)?),
    }
}

/// Write a descriptor to a file, choosing the format from its extension.
pub fn write_file(path: &Path, metadata: &PackageMetadata) -> Result<()> {
    let format = detect_format(path)?;
    std::fs::write(path, to_string(metadata, format)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcheck_core::FieldType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_valid_json_minimal() {
        let metadata = parse_json(r#"{"name": "empty", "resources": []}"#).unwrap();
        assert_eq!(metadata.name(), Some("empty"));
        assert_eq!(metadata.resource_count(), 0);
        assert!(metadata.schema().unwrap().is_none());
    }

    #[test]
    fn test_parse_json_with_schema() {
        let json = r#"{
            "name": "gdp",
            "resources": [{
                "name": "gdp",
                "schema": {
                    "fields": [
                        {"name": "Country Name", "type": "string"},
                        {"name": "Value", "type": "number", "constraints": {"minimum": 0}}
                    ]
                }
            }]
        }"#;

        let metadata = parse_json(json).expect("Failed to parse JSON with schema");
        let schema = metadata.schema().unwrap().unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields[1].field_type, FieldType::Number);
        assert!(schema.fields[1].has_constraints());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_json("{ not json");
        assert!(matches!(result, Err(MetadataError::JsonError(_))));
    }

    #[test]
    fn test_parse_json_non_object() {
        let result = parse_json("[1, 2, 3]");
        assert!(matches!(result, Err(MetadataError::DescriptorError(_))));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_yaml("name: [unclosed");
        assert!(matches!(result, Err(MetadataError::YamlError(_))));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("datapackage.json")).unwrap(),
            DescriptorFormat::Json
        );
        assert_eq!(
            detect_format(Path::new("datapackage.YML")).unwrap(),
            DescriptorFormat::Yaml
        );
        assert!(matches!(
            detect_format(Path::new("datapackage.toml")),
            Err(MetadataError::UnsupportedFormat(ext)) if ext == "toml"
        ));
        assert!(matches!(
            detect_format(Path::new("datapackage")),
            Err(MetadataError::InvalidExtension)
        ));
    }

    #[test]
    fn test_write_then_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datapackage.yaml");
        let original = parse_json(
            r#"{"name": "p", "resources": [{"name": "r", "schema": {"fields": [{"name": "a", "type": "date", "format": "%d/%m/%Y"}]}}]}"#,
        )
        .unwrap();

        write_file(&path, &original).unwrap();
        let loaded = parse_file(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
