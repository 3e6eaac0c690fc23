use std::path::Path;

use tracing::{error, info, warn};

use crate::config::ExtractorConfig;
use crate::error::PersistenceError;
use crate::extractors::{
    ExtractionMethod, TableCapability, TextCapability, extract_from_tables, extract_from_text,
};
use crate::helpers::pdf::LopdfBackend;
use crate::helpers::spreadsheet;
use crate::models::RecordSet;

/// Records pulled from a document, with the method that found them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub method: ExtractionMethod,
    pub records: RecordSet,
}

/// Runs table extraction first and falls back to page text when that
/// yields nothing, then hands the result to the spreadsheet writer.
pub struct ExtractionService {
    pub config: ExtractorConfig,
    tables: Box<dyn TableCapability>,
    text: Box<dyn TextCapability>,
}

impl ExtractionService {
    /// Create a service backed by lopdf for both extraction methods.
    pub fn new(config: ExtractorConfig) -> Self {
        let backend = LopdfBackend::new(config.enable_tables, config.layout.clone());
        Self::with_capabilities(config, Box::new(backend.clone()), Box::new(backend))
    }

    pub fn with_capabilities(
        config: ExtractorConfig,
        tables: Box<dyn TableCapability>,
        text: Box<dyn TextCapability>,
    ) -> Self {
        info!("Creating new ExtractionService instance");
        Self {
            config,
            tables,
            text,
        }
    }

    /// Extract records from the configured input file.
    pub fn extract(&self) -> Option<Extraction> {
        self.extract_from(&self.config.input)
    }

    /// Extract records from `path`. Returns `None` when neither method finds
    /// any record; every failure along the way is logged, never raised.
    pub fn extract_from(&self, path: &Path) -> Option<Extraction> {
        info!("Processing time-clock report: {}", path.display());

        if self.tables.is_available() {
            match extract_from_tables(&*self.tables, path, &self.config).into_result() {
                Ok(records) => return Some(self.finish(ExtractionMethod::Tables, records)),
                Err(e) => warn!("Table extraction gave no records: {}", e),
            }
        } else {
            info!("Table extraction not available, going straight to text");
        }

        info!("Trying plain-text fallback");
        match extract_from_text(&*self.text, path, &self.config).into_result() {
            Ok(records) => Some(self.finish(ExtractionMethod::Text, records)),
            Err(e) => {
                error!("Text fallback gave no records: {}", e);
                None
            }
        }
    }

    fn finish(&self, method: ExtractionMethod, records: RecordSet) -> Extraction {
        match records.date_span() {
            Some((first, last)) => info!(
                "Extracted {} record(s) via {} extraction, covering {} to {}",
                records.len(),
                method,
                first.format("%d/%m/%Y"),
                last.format("%d/%m/%Y")
            ),
            None => info!("Extracted {} record(s) via {} extraction", records.len(), method),
        }

        Extraction { method, records }
    }

    /// Write the extraction to the configured output file.
    pub fn export(&self, extraction: &Extraction) -> Result<(), PersistenceError> {
        let output = &self.config.output;
        info!("Saving {} record(s) to {}", extraction.records.len(), output.display());

        spreadsheet::write_records(output, &self.config.column_names, &extraction.records).map_err(
            |e| {
                error!("Failed to save {}: {}", output.display(), e);
                e
            },
        )
    }
}
