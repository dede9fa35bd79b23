use anyhow::{Context, Result, anyhow};
use cellcheck_package::{ColumnChange, apply_change, parse_file, write_file};
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(descriptor_path: &str, change: &str, output_path: Option<&str>) -> Result<()> {
    info!("Synchronizing descriptor schema: {}", descriptor_path);

    let change = read_change(change)?;
    let mut metadata = parse_file(Path::new(descriptor_path))
        .with_context(|| format!("Failed to parse descriptor file: {}", descriptor_path))?;
    let mut schema = metadata
        .schema()
        .with_context(|| format!("Invalid schema in: {}", descriptor_path))?
        .ok_or_else(|| anyhow!("Descriptor has no schema: {}", descriptor_path))?;

    apply_change(&mut schema, &change)
        .with_context(|| format!("Change '{}' was not applied", change.kind()))?;
    metadata.set_schema_fields(&schema.fields)?;

    let target = output_path.unwrap_or(descriptor_path);
    write_file(Path::new(target), &metadata)
        .with_context(|| format!("Failed to write descriptor: {}", target))?;

    output::print_success(&format!(
        "Applied '{}' change, schema now has {} fields",
        change.kind(),
        schema.len()
    ));
    Ok(())
}

/// Inline JSON, or a path to a file holding it.
fn read_change(change: &str) -> Result<ColumnChange> {
    let content = if change.trim_start().starts_with('{') {
        change.to_string()
    } else {
        std::fs::read_to_string(change)
            .with_context(|| format!("Failed to read change file: {}", change))?
    };
    serde_json::from_str(&content).context("Invalid change notification")
}
