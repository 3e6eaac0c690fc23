//! Time-clock report extraction library
//!
//! This library reads attendance records (name, date, four clock events and
//! a daily total) out of time-clock PDF reports and writes them to a
//! spreadsheet. Tables rebuilt from the page layout are tried first; the
//! plain page text is parsed as a fallback.

pub mod config;
pub mod error;
pub mod extractors;
pub mod helpers;
pub mod models;
pub mod service;

pub use config::ExtractorConfig;
pub use error::{ConfigError, ExtractError, PersistenceError};
pub use service::{Extraction, ExtractionService};

// Re-export key types for convenience
pub use extractors::{ExtractionMethod, Outcome};
pub use helpers::normalize::normalize;
pub use models::{CellValue, RawTable, Record, RecordSet};
