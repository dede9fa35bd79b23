use anyhow::{Context, Result};
use cellcheck_core::CancellationFlag;
use cellcheck_package::parse_file;
use cellcheck_validator::ValidationService;
use std::path::Path;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::{loader, output};

pub async fn execute(
    descriptor_path: &str,
    data_path: &str,
    columns: Option<Vec<String>>,
    strict: Option<bool>,
    format: &str,
    config: &CliConfig,
) -> Result<()> {
    info!("Validating data: {}", data_path);
    info!("Descriptor: {}", descriptor_path);

    let metadata = parse_file(Path::new(descriptor_path))
        .with_context(|| format!("Failed to parse descriptor file: {}", descriptor_path))?;

    let data = Path::new(data_path);
    let name = metadata
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| loader::file_stem(data, "data"));
    let mut dataset = loader::load_csv(data, &name, &name)?;
    dataset.attach_metadata(metadata);

    // Columns default to every schema field, in schema order.
    let columns = columns.unwrap_or_else(|| {
        dataset
            .schema()
            .map(|schema| schema.field_names().map(str::to_string).collect())
            .unwrap_or_default()
    });

    if format != "json" {
        output::print_info(&format!(
            "Dataset loaded: {} ({} columns, {} rows)",
            name,
            dataset.columns.len(),
            dataset.len()
        ));
    }

    let cancellation = CancellationFlag::new();
    let options = config
        .inspect_options(columns, strict)
        .with_cancellation(cancellation.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping validation");
            cancellation.cancel();
        }
    });

    let service = ValidationService::new().with_concurrency(config.concurrent);
    service.register(dataset).await?;
    let report = service.inspect(&name, &options).await?;

    output::print_validation_report(&report, format)?;

    if !report.passed() || report.interrupted {
        std::process::exit(1);
    }

    Ok(())
}
