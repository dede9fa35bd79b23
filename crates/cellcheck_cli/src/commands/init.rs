use anyhow::{Context, Result};
use cellcheck_core::{ColumnModel, PackageMetadata};
use cellcheck_package::{DescriptorFormat, parser, write_file};
use std::path::Path;
use tracing::info;

use crate::{loader, output};

pub fn execute(data_path: &str, name: Option<&str>, output_path: Option<&str>) -> Result<()> {
    info!("Initializing descriptor from data: {}", data_path);

    let data = Path::new(data_path);
    let header = loader::read_header(data)?;
    let columns = ColumnModel::from_names(header)
        .with_context(|| format!("Invalid header in: {}", data_path))?;

    let name = name.map_or_else(|| loader::file_stem(data, "data"), str::to_string);
    let metadata = PackageMetadata::for_columns(name.as_str(), &columns)?;

    match output_path {
        Some(path) => {
            write_file(Path::new(path), &metadata)
                .with_context(|| format!("Failed to write descriptor: {}", path))?;
            output::print_success(&format!(
                "Descriptor written to {} ({} fields)",
                path,
                columns.len()
            ));
        }
        None => println!("{}", parser::to_string(&metadata, DescriptorFormat::Json)?),
    }

    Ok(())
}
