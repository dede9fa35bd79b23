//! CSV loading.

use anyhow::{Context, Result};
use cellcheck_core::{ColumnModel, Dataset, Row};
use std::path::Path;
use tracing::debug;

/// Reads the header of a CSV file.
pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of: {}", path.display()))?;
    Ok(headers.iter().map(str::to_string).collect())
}

/// Loads a CSV file as a dataset: header row as the column model, one row per
/// record. Empty fields are read as empty text, which counts as missing.
pub fn load_csv(path: &Path, id: &str, name: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of: {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut dataset = Dataset::new(id, name);
    dataset.columns = ColumnModel::from_names(headers)
        .with_context(|| format!("Invalid header in: {}", path.display()))?;

    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read record {} of data", line + 1))?;
        dataset.push_row(Row::from_values(record.iter()));
    }

    debug!(
        columns = dataset.columns.len(),
        rows = dataset.len(),
        "loaded {}",
        path.display()
    );
    Ok(dataset)
}

/// Returns the file stem of a path, or `fallback`.
pub fn file_stem(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(fallback)
        .to_string()
}
