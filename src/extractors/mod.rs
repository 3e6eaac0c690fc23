//! The two extraction methods and the capabilities they run on.

pub mod fallback;
pub mod structured;

use std::fmt;
use std::path::Path;

use crate::error::ExtractError;
use crate::helpers::layout::DetectedTable;
use crate::models::RecordSet;

pub use fallback::extract_from_text;
pub use structured::extract_from_tables;

/// Something that can open a document and find tables in it.
pub trait TableCapability {
    /// False when table detection is not usable in this environment.
    fn is_available(&self) -> bool;

    fn open(&self, path: &Path) -> Result<Box<dyn TableDocument>, ExtractError>;
}

pub trait TableDocument {
    fn tables(&self) -> Result<Vec<DetectedTable>, ExtractError>;

    /// Releases the document. Must be called on every path after `open`.
    fn close(self: Box<Self>);
}

/// Something that can open a document and return its plain text per page.
pub trait TextCapability {
    fn is_available(&self) -> bool;

    fn open(&self, path: &Path) -> Result<Box<dyn TextDocument>, ExtractError>;
}

pub trait TextDocument {
    fn page_texts(&self) -> Result<Vec<String>, ExtractError>;

    /// Releases the document. Must be called on every path after `open`.
    fn close(self: Box<Self>);
}

/// Which extractor produced a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Tables,
    Text,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Tables => write!(f, "table"),
            ExtractionMethod::Text => write!(f, "text fallback"),
        }
    }
}

/// Result of one extraction attempt.
#[derive(Debug)]
pub enum Outcome {
    Extracted(RecordSet),
    /// The attempt ran but found nothing usable.
    Empty,
    Failed(ExtractError),
}

impl Outcome {
    /// Collapses the outcome into records or the reason there are none.
    /// A zero-row set counts as empty.
    pub fn into_result(self) -> Result<RecordSet, ExtractError> {
        match self {
            Outcome::Extracted(records) if !records.is_empty() => Ok(records),
            Outcome::Extracted(_) | Outcome::Empty => Err(ExtractError::ExtractionEmpty),
            Outcome::Failed(e) => Err(e),
        }
    }
}

impl From<RecordSet> for Outcome {
    fn from(records: RecordSet) -> Self {
        if records.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Extracted(records)
        }
    }
}
