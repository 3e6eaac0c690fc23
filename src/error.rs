use std::path::PathBuf;

use thiserror::Error;

/// Failures inside a single extraction attempt.
///
/// None of these escape the attempt boundary: the extractors wrap them in an
/// [`Outcome::Failed`](crate::extractors::Outcome) and the orchestrator logs
/// them before moving on to the next method.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0} capability is not available")]
    CapabilityUnavailable(&'static str),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Table {index} on page {page} could not be converted: {reason}")]
    ConversionFailure {
        page: u32,
        index: usize,
        reason: String,
    },

    #[error("Extraction produced no usable records")]
    ExtractionEmpty,

    #[error("PDF parsing failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Failure writing the final record table to disk.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
