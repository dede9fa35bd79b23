use anyhow::{Context, Result, anyhow};
use cellcheck_package::parse_file;
use cellcheck_validator::ConstraintRegistry;
use serde_json::json;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(descriptor_path: &str, format: &str) -> Result<()> {
    info!("Checking descriptor schema: {}", descriptor_path);

    let metadata = parse_file(Path::new(descriptor_path))
        .with_context(|| format!("Failed to parse descriptor file: {}", descriptor_path))?;
    let schema = metadata
        .schema()
        .with_context(|| format!("Invalid schema in: {}", descriptor_path))?
        .ok_or_else(|| anyhow!("Descriptor has no schema: {}", descriptor_path))?;

    let registry = ConstraintRegistry::shared();

    if format == "json" {
        let mut unknown = Vec::new();
        for field in &schema.fields {
            for name in field.constraints.keys() {
                if !registry.contains(name) {
                    unknown.push(format!("{}.{}", field.name, name));
                }
            }
        }
        let output = json!({
            "name": metadata.name(),
            "fields": schema.fields_value()?,
            "unknown_constraints": unknown,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::print_success("Descriptor schema is valid");

    println!("\nPackage Summary:");
    println!("  Name:       {}", metadata.name().unwrap_or("N/A"));
    println!("  Resources:  {}", metadata.resource_count());
    println!("  Fields:     {}", schema.len());

    let unknown = output::print_schema(&schema, &registry);
    if !unknown.is_empty() {
        println!();
        for name in &unknown {
            output::print_warning(&format!(
                "Unknown constraint '{}' will be skipped during validation",
                name
            ));
        }
    }

    Ok(())
}
