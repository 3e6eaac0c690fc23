use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::PersistenceError;
use crate::models::{RecordSet, SCHEMA_WIDTH};

/// Writes `records` to `path` with `headers` as the first row.
///
/// The format follows the extension: `.xlsx` writes an Excel workbook,
/// `.json` an array of header-keyed objects and anything else CSV. There is
/// no index column.
pub fn write_records(
    path: &Path,
    headers: &[String; SCHEMA_WIDTH],
    records: &RecordSet,
) -> Result<(), PersistenceError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("xlsx") => write_xlsx(path, headers, records)?,
        Some("json") => write_json(path, headers, records)?,
        _ => write_csv(path, headers, records)?,
    }

    info!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

fn write_xlsx(
    path: &Path,
    headers: &[String; SCHEMA_WIDTH],
    records: &RecordSet,
) -> Result<(), PersistenceError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in (0u16..).zip(headers) {
        worksheet.write_string_with_format(0, col, header, &bold)?;
    }

    for (row, record) in (1u32..).zip(records) {
        for (col, value) in (0u16..).zip(record.fields()) {
            if !value.is_empty() {
                worksheet.write_string(row, col, value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_csv(
    path: &Path,
    headers: &[String; SCHEMA_WIDTH],
    records: &RecordSet,
) -> Result<(), PersistenceError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;

    for record in records {
        writer.write_record(record.fields())?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json(
    path: &Path,
    headers: &[String; SCHEMA_WIDTH],
    records: &RecordSet,
) -> Result<(), PersistenceError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .zip(record.fields())
                .map(|(header, value)| (header.clone(), serde_json::Value::from(value)))
                .collect()
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.flush()?;
    Ok(())
}
