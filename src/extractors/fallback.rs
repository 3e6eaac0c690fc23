use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extractors::{Outcome, TextCapability};
use crate::helpers::normalize::{clear_blank, normalize};
use crate::models::{Record, RecordSet};

/// Timestamps kept per date: four clock events plus the daily total.
pub const TIMESTAMPS_PER_RECORD: usize = 5;

/// Filler for clock columns the snippet had no timestamp for.
pub const MISSING_TIMESTAMP: &str = "";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("valid date regex"));

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}").expect("valid time regex"));

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid blank line regex"));

static LETTERHEAD_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^.*(?:estado de mato grosso|rela[çc][ãa]o de registro|institui[çc][ãa]o|p[áa]gina\s*\d+|emiss[ãa]o\b).*$\n?",
    )
    .expect("valid letterhead regex")
});

static COLUMN_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)nome\s+data\s+entr\.?\s*manh[ãa]\s+sa[íi]d\.?\s*manh[ãa]\s+entr\.?\s*tarde\s+sa[íi]d\.?\s*tarde\s+total",
    )
    .expect("valid column header regex")
});

/// Rebuilds records from the plain text of the document at `path`.
///
/// Used when no tables could be read. Each `DD/MM/YYYY` in the text anchors
/// one record; its timestamps and name are taken from the text just before
/// it.
pub fn extract_from_text(
    capability: &dyn TextCapability,
    path: &Path,
    config: &ExtractorConfig,
) -> Outcome {
    if !capability.is_available() {
        warn!("Text extraction not available");
        return Outcome::Failed(ExtractError::CapabilityUnavailable("text"));
    }

    if !path.exists() {
        warn!("File not found: {}", path.display());
        return Outcome::Failed(ExtractError::InputNotFound(path.to_path_buf()));
    }

    info!("Extracting plain text from {} (fallback)", path.display());

    let document = match capability.open(path) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to open {} for text extraction: {}", path.display(), e);
            return Outcome::Failed(e);
        }
    };
    let pages = document.page_texts();
    document.close();

    let pages = match pages {
        Ok(pages) => pages,
        Err(e) => {
            warn!("Text extraction failed: {}", e);
            return Outcome::Failed(e);
        }
    };

    let text = strip_letterhead(&join_pages(&pages));
    let records = records_from_text(&text, config.lookback_chars);

    if records.is_empty() {
        info!("No records found in page text");
        return Outcome::Empty;
    }

    let records: Vec<Record> = records.into_iter().map(finish_record).collect();
    let records = RecordSet::from(records);
    info!("Text fallback produced {} record(s)", records.len());

    Outcome::from(records)
}

/// Joins page texts with newlines, maps tabs to spaces and collapses runs of
/// blank lines.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let joined = pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
        .replace('\t', " ");
    BLANK_LINES_RE.replace_all(&joined, "\n").into_owned()
}

/// Removes letterhead, pagination and issue-date lines plus the column header
/// run, so their dates and labels cannot be read as records.
pub fn strip_letterhead(text: &str) -> String {
    let text = LETTERHEAD_LINE_RE.replace_all(text, "");
    COLUMN_HEADER_RE.replace_all(&text, "").into_owned()
}

/// Builds one record per date found in `text`.
///
/// The context for a date is at most `lookback_chars` characters before it,
/// and never reaches back past the previous date, so one day's timestamps
/// cannot bleed into the next. Of the timestamps in that context the last
/// [`TIMESTAMPS_PER_RECORD`] are kept; missing trailing ones are
/// [`MISSING_TIMESTAMP`]. The name is whatever precedes the first timestamp,
/// or the whole snippet including the date when there is none.
pub fn records_from_text(text: &str, lookback_chars: usize) -> Vec<Record> {
    let mut records = Vec::new();
    let mut previous_end = 0;

    for date in DATE_RE.find_iter(text) {
        let start = lookback_start(text, date.start(), lookback_chars).max(previous_end);
        let context = &text[start..date.start()];
        previous_end = date.end();

        let stamps: Vec<regex::Match<'_>> = TIME_RE.find_iter(context).collect();
        let name = match stamps.first() {
            Some(first) => normalize(&context[..first.start()]),
            None => normalize(&text[start..date.end()]),
        };

        let skip = stamps.len().saturating_sub(TIMESTAMPS_PER_RECORD);
        if skip > 0 {
            debug!(
                "{} timestamps before {}, keeping the last {}",
                stamps.len(),
                date.as_str(),
                TIMESTAMPS_PER_RECORD
            );
        }

        let mut times = stamps[skip..].iter().map(|m| m.as_str().to_string());
        let mut next_time = || times.next().unwrap_or_else(|| MISSING_TIMESTAMP.to_string());

        records.push(Record {
            name,
            date: date.as_str().to_string(),
            morning_in: next_time(),
            morning_out: next_time(),
            afternoon_in: next_time(),
            afternoon_out: next_time(),
            total: next_time(),
        });
    }

    records
}

fn finish_record(mut record: Record) -> Record {
    for field in record.fields_mut() {
        *field = clear_blank(field);
    }
    record.name = normalize(&record.name);
    record
}

/// Byte offset `chars` characters before `pos`, or 0 if the text is shorter.
fn lookback_start(text: &str, pos: usize, chars: usize) -> usize {
    if chars == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}
