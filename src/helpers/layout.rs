//! Rebuilds table grids from positioned page text.
//!
//! Time-clock reports are drawn as aligned text runs rather than tagged
//! tables, so a "table" here is a block of consecutive lines that each carry
//! several fragments, and its columns are the clusters of fragment x
//! positions.

use std::cmp::Ordering;

use crate::error::ExtractError;
use crate::helpers::row_filter::is_noise_row;
use crate::models::{CellValue, RawTable};

/// A piece of text shown at a fixed position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub x: f32,
    pub y: f32,
    pub value: CellValue,
}

impl TextFragment {
    pub fn new(x: f32, y: f32, value: CellValue) -> Self {
        TextFragment { x, y, value }
    }
}

/// One block of aligned lines found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    /// 1-based page number.
    pub page: u32,
    /// Position of the table on its page.
    pub index: usize,
    pub lines: Vec<Vec<TextFragment>>,
}

impl DetectedTable {
    /// Converts the fragments into a grid of cells.
    ///
    /// Column anchors are the left-most x of each cluster of fragment
    /// positions; a fragment lands in the right-most anchor at or left of it.
    /// Fragments sharing a cell are joined with a space and cells nothing
    /// landed in stay [`CellValue::Empty`].
    ///
    /// Anchors come from data lines only. Header and footer lines matching
    /// `noise_keywords` are often centred over their columns and would
    /// otherwise split every data row with empty columns.
    pub fn to_grid<S: AsRef<str>>(
        &self,
        column_tolerance: f32,
        noise_keywords: &[S],
    ) -> Result<RawTable, ExtractError> {
        let fragments = self.lines.iter().flatten();

        if let Some(bad) = fragments.clone().find(|f| !f.x.is_finite() || !f.y.is_finite()) {
            return Err(ExtractError::ConversionFailure {
                page: self.page,
                index: self.index,
                reason: format!("fragment has non-finite position ({}, {})", bad.x, bad.y),
            });
        }

        let data_lines: Vec<&Vec<TextFragment>> = self
            .lines
            .iter()
            .filter(|line| !is_noise_row(&line_values(line), noise_keywords))
            .collect();

        let mut xs: Vec<f32> = if data_lines.is_empty() {
            fragments.map(|f| f.x).collect()
        } else {
            data_lines.iter().flat_map(|line| line.iter().map(|f| f.x)).collect()
        };
        xs.sort_by(f32::total_cmp);

        let mut anchors: Vec<f32> = Vec::new();
        for x in xs {
            if anchors.last().is_none_or(|a| x - a > column_tolerance) {
                anchors.push(x);
            }
        }

        let rows = self
            .lines
            .iter()
            .map(|line| {
                let mut cells = vec![CellValue::Empty; anchors.len()];
                for fragment in line {
                    let column = anchors
                        .iter()
                        .rposition(|a| *a <= fragment.x + column_tolerance)
                        .unwrap_or(0);
                    let current = std::mem::replace(&mut cells[column], CellValue::Empty);
                    cells[column] = current.merge(fragment.value.clone());
                }
                cells
            })
            .collect();

        Ok(RawTable::new(rows))
    }

    /// Builds a table whose rows sit on evenly spaced baselines and whose
    /// cells sit on evenly spaced columns. Empty strings leave a gap.
    #[cfg(test)]
    pub(crate) fn from_rows(page: u32, index: usize, rows: &[&[&str]]) -> Self {
        let lines = rows
            .iter()
            .enumerate()
            .map(|(r, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, text)| !text.is_empty())
                    .map(|(c, text)| {
                        TextFragment::new(40.0 + 80.0 * c as f32, 700.0 - 14.0 * r as f32, CellValue::text(*text))
                    })
                    .collect()
            })
            .collect();

        DetectedTable { page, index, lines }
    }
}

fn line_values(line: &[TextFragment]) -> Vec<CellValue> {
    line.iter().map(|f| f.value.clone()).collect()
}

/// Groups fragments into lines, top of the page first, each line ordered
/// left to right.
pub fn group_lines(mut fragments: Vec<TextFragment>, row_tolerance: f32) -> Vec<Vec<TextFragment>> {
    fragments.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<Vec<TextFragment>> = Vec::new();
    let mut baseline = f32::NAN;

    for fragment in fragments {
        match lines.last_mut() {
            Some(line) if (baseline - fragment.y).abs() <= row_tolerance => line.push(fragment),
            _ => {
                baseline = fragment.y;
                lines.push(vec![fragment]);
            }
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }

    lines
}

/// Splits a page's lines into tables: maximal runs of consecutive lines with
/// at least `min_columns` fragments each.
pub fn detect_tables(
    page: u32,
    lines: Vec<Vec<TextFragment>>,
    min_columns: usize,
) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<TextFragment>> = Vec::new();

    for line in lines {
        if line.len() >= min_columns.max(1) {
            current.push(line);
        } else if !current.is_empty() {
            tables.push(DetectedTable {
                page,
                index: tables.len(),
                lines: std::mem::take(&mut current),
            });
        }
    }

    if !current.is_empty() {
        tables.push(DetectedTable {
            page,
            index: tables.len(),
            lines: current,
        });
    }

    tables
}
