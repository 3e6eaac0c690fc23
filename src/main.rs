use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use timeclock_extract::{ExtractionService, ExtractorConfig};

/// Extract time-clock attendance records from a PDF report into a spreadsheet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PDF report to read (defaults to the configured input, `entrada.pdf`)
    input: Option<PathBuf>,

    /// Output spreadsheet (default `saida.xlsx`); `.xlsx` writes Excel, `.json` JSON, anything else CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip table extraction and read the page text only
    #[arg(long)]
    no_tables: bool,

    /// Log debug detail
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<ExtractorConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractorConfig::from_file(path)
            .with_context(|| format!("could not load configuration from {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if args.no_tables {
        config.enable_tables = false;
    }

    Ok(config)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    info!("Starting time-clock extraction");

    let service = ExtractionService::new(config);
    let separator = "-".repeat(40);

    let Some(extraction) = service.extract() else {
        println!("{separator}");
        println!("Extraction failed. No data found.");
        return Ok(ExitCode::SUCCESS);
    };

    println!("{separator}");
    println!(
        "Total records extracted: {} ({} extraction)",
        extraction.records.len(),
        extraction.method
    );

    match service.export(&extraction) {
        Ok(()) => {
            println!("Spreadsheet saved: {}", service.config.output.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error saving spreadsheet: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
