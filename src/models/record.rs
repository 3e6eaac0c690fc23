use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of fields in the canonical record schema.
pub const SCHEMA_WIDTH: usize = 7;

/// Canonical column headers, in schema order.
pub const DEFAULT_COLUMN_NAMES: [&str; SCHEMA_WIDTH] = [
    "Name",
    "Date",
    "MorningIn",
    "MorningOut",
    "AfternoonIn",
    "AfternoonOut",
    "Total",
];

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date regex"));

/// Returns true when `value` is exactly a `DD/MM/YYYY` date.
pub fn is_valid_date(value: &str) -> bool {
    DATE_RE.is_match(value)
}

/// One attendance entry.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub date: String,
    pub morning_in: String,
    pub morning_out: String,
    pub afternoon_in: String,
    pub afternoon_out: String,
    pub total: String,
}

impl Record {
    pub fn fields(&self) -> [&str; SCHEMA_WIDTH] {
        [
            &self.name,
            &self.date,
            &self.morning_in,
            &self.morning_out,
            &self.afternoon_in,
            &self.afternoon_out,
            &self.total,
        ]
    }

    pub fn fields_mut(&mut self) -> [&mut String; SCHEMA_WIDTH] {
        [
            &mut self.name,
            &mut self.date,
            &mut self.morning_in,
            &mut self.morning_out,
            &mut self.afternoon_in,
            &mut self.afternoon_out,
            &mut self.total,
        ]
    }

    /// Calendar date of the entry, if the `DD/MM/YYYY` string is a real day.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%d/%m/%Y").ok()
    }
}

impl From<[String; SCHEMA_WIDTH]> for Record {
    fn from(cells: [String; SCHEMA_WIDTH]) -> Self {
        let [name, date, morning_in, morning_out, afternoon_in, afternoon_out, total] = cells;
        Record {
            name,
            date,
            morning_in,
            morning_out,
            afternoon_in,
            afternoon_out,
            total,
        }
    }
}

/// Ordered attendance records, in document order.
///
/// Every record held here has a `DD/MM/YYYY` date; anything else is dropped
/// when the set is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Earliest and latest calendar dates covered by the set.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(Record::parsed_date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        let before = records.len();
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| is_valid_date(&r.date))
            .collect();

        if records.len() < before {
            debug!(
                "Dropped {} row(s) without a DD/MM/YYYY date",
                before - records.len()
            );
        }

        RecordSet { records }
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
