/// A single cell as recovered from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Empty,
    /// The cell had content that could not be decoded as text.
    Unrepresentable,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Merges a second fragment landing in the same cell.
    pub fn merge(self, other: CellValue) -> CellValue {
        match (self, other) {
            (CellValue::Unrepresentable, _) | (_, CellValue::Unrepresentable) => {
                CellValue::Unrepresentable
            }
            (CellValue::Empty, other) => other,
            (this, CellValue::Empty) => this,
            (CellValue::Text(a), CellValue::Text(b)) => CellValue::Text(format!("{a} {b}")),
        }
    }

    /// Text content, with `Empty` and `Unrepresentable` both mapped to "".
    pub fn into_string(self) -> String {
        match self {
            CellValue::Text(s) => s,
            CellValue::Empty | CellValue::Unrepresentable => String::new(),
        }
    }
}

/// A grid recovered from one detected table, before schema normalization.
/// Rows may have differing widths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        RawTable { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Forces every row to exactly `width` cells: extra trailing cells are
    /// dropped, missing ones are filled with [`CellValue::Empty`].
    pub fn into_width(self, width: usize) -> Vec<Vec<CellValue>> {
        self.rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect()
    }
}
