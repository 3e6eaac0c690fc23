use std::path::Path;

use tracing::{info, warn};

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extractors::{Outcome, TableCapability};
use crate::helpers::normalize::{clear_blank, normalize, strip_boilerplate, strip_day_annotation};
use crate::helpers::row_filter::is_noise_row;
use crate::models::{CellValue, Record, RecordSet, SCHEMA_WIDTH};

/// Extracts records from the tables found in the document at `path`.
///
/// Never fails outward: a missing capability, a missing file or a parse
/// error all come back as [`Outcome::Failed`], and a document without usable
/// rows as [`Outcome::Empty`]. A table that cannot be converted is skipped
/// and the rest are still read.
pub fn extract_from_tables(
    capability: &dyn TableCapability,
    path: &Path,
    config: &ExtractorConfig,
) -> Outcome {
    if !capability.is_available() {
        info!("Table extraction not available, skipping");
        return Outcome::Failed(ExtractError::CapabilityUnavailable("table"));
    }

    if !path.exists() {
        warn!("File not found: {}", path.display());
        return Outcome::Failed(ExtractError::InputNotFound(path.to_path_buf()));
    }

    info!("Extracting tables from {}", path.display());

    let document = match capability.open(path) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to open {} for table extraction: {}", path.display(), e);
            return Outcome::Failed(e);
        }
    };
    let tables = document.tables();
    document.close();

    let tables = match tables {
        Ok(tables) => tables,
        Err(e) => {
            warn!("Table detection failed: {}", e);
            return Outcome::Failed(e);
        }
    };

    if tables.is_empty() {
        info!("No tables detected");
        return Outcome::Empty;
    }

    let mut rows: Vec<Vec<CellValue>> = Vec::new();

    for table in &tables {
        let grid = match table.to_grid(config.layout.column_tolerance, &config.noise_keywords) {
            Ok(grid) => grid,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if grid.is_empty() {
            continue;
        }

        rows.extend(
            grid.into_width(SCHEMA_WIDTH)
                .into_iter()
                .filter(|row| !is_noise_row(row, &config.noise_keywords)),
        );
    }

    if rows.is_empty() {
        info!("Table extraction left no data rows after filtering");
        return Outcome::Empty;
    }

    let records: Vec<Record> = rows.into_iter().map(clean_row).collect();
    let records = RecordSet::from(records);

    info!(
        "Table extraction produced {} record(s) from {} table(s)",
        records.len(),
        tables.len()
    );

    Outcome::from(records)
}

/// Turns one schema-width row into a record: placeholders cleared, the name
/// normalized and stripped of day labels, and leaked boilerplate cut from
/// every field.
fn clean_row(row: Vec<CellValue>) -> Record {
    let mut cells: [String; SCHEMA_WIDTH] = Default::default();
    for (slot, cell) in cells.iter_mut().zip(row) {
        *slot = clear_blank(&cell.into_string());
    }

    let mut record = Record::from(cells);
    record.name = strip_day_annotation(&normalize(&record.name));

    for field in record.fields_mut() {
        *field = strip_boilerplate(field);
    }

    record
}
