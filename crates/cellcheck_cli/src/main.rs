mod commands;
mod config;
mod loader;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::CliConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cellcheck")]
#[command(version, about = "Table schema cell validation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a cellcheck.toml configuration file
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate CSV data against a data package descriptor
    Validate {
        /// Path to the descriptor (JSON or YAML)
        descriptor: String,

        /// Path to the CSV data
        #[arg(short, long)]
        data: String,

        /// Comma-separated columns to validate (defaults to every schema field)
        #[arg(short, long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Accept lenient literals (e.g. integers written as "1.0")
        #[arg(long)]
        lenient: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check a descriptor's schema without reading data
    Check {
        /// Path to the descriptor (JSON or YAML)
        descriptor: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Initialize a descriptor from the header of a CSV file
    Init {
        /// Path to the CSV data
        #[arg(short, long)]
        data: String,

        /// Package and resource name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Apply a column change notification to a descriptor's schema
    Sync {
        /// Path to the descriptor (JSON or YAML)
        descriptor: String,

        /// Change notification, inline JSON or a path to a JSON file
        #[arg(long)]
        change: String,

        /// Output file path (defaults to rewriting the descriptor)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.log_level()?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Validate {
            descriptor,
            data,
            columns,
            lenient,
            format,
        } => {
            let strict = if lenient { Some(false) } else { None };
            commands::validate::execute(&descriptor, &data, columns, strict, &format, &config)
                .await
        }

        Commands::Check { descriptor, format } => commands::check::execute(&descriptor, &format),

        Commands::Init { data, name, output } => {
            commands::init::execute(&data, name.as_deref(), output.as_deref())
        }

        Commands::Sync {
            descriptor,
            change,
            output,
        } => commands::sync::execute(&descriptor, &change, output.as_deref()),
    }
}
