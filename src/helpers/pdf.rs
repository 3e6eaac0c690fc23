use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lopdf::content::Operation;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::error::ExtractError;
use crate::extractors::{TableCapability, TableDocument, TextCapability, TextDocument};
use crate::helpers::layout::{DetectedTable, TextFragment, detect_tables, group_lines};
use crate::models::CellValue;

/// TJ adjustments more negative than this (thousandths of an em) read as a
/// word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Rough glyph advance as a fraction of the font size, used only to move the
/// pen past a shown string when no explicit positioning follows.
const APPROX_GLYPH_WIDTH: f32 = 0.5;

/// Text encodings of a page's fonts, keyed by resource name (`F1`, ...).
pub type FontEncodings<'a> = BTreeMap<Vec<u8>, Encoding<'a>>;

fn load_pdf<P: AsRef<Path>>(path: P) -> Result<Document, lopdf::Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Document::load_from(reader)
}

/// Both extraction capabilities backed by lopdf.
#[derive(Debug, Clone)]
pub struct LopdfBackend {
    tables_enabled: bool,
    layout: LayoutConfig,
}

impl LopdfBackend {
    pub fn new(tables_enabled: bool, layout: LayoutConfig) -> Self {
        LopdfBackend {
            tables_enabled,
            layout,
        }
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        LopdfBackend::new(true, LayoutConfig::default())
    }
}

impl TableCapability for LopdfBackend {
    fn is_available(&self) -> bool {
        self.tables_enabled
    }

    fn open(&self, path: &Path) -> Result<Box<dyn TableDocument>, ExtractError> {
        Ok(Box::new(PdfDocument::open(path, self.layout.clone())?))
    }
}

impl TextCapability for LopdfBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn open(&self, path: &Path) -> Result<Box<dyn TextDocument>, ExtractError> {
        Ok(Box::new(PdfDocument::open(path, self.layout.clone())?))
    }
}

/// An open PDF. Released by [`PdfDocument::release`].
pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
    layout: LayoutConfig,
}

impl PdfDocument {
    pub fn open(path: &Path, layout: LayoutConfig) -> Result<Self, ExtractError> {
        let doc = load_pdf(path)?;
        info!(
            "Loaded PDF {} with {} page(s)",
            path.display(),
            doc.get_pages().len()
        );

        Ok(PdfDocument {
            path: path.to_path_buf(),
            doc,
            layout,
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Plain text of every page, in page order.
    pub fn page_texts(&self) -> Result<Vec<String>, ExtractError> {
        let mut texts = Vec::with_capacity(self.page_count());

        for page_number in self.doc.get_pages().keys() {
            let text = self.doc.extract_text(&[*page_number])?;
            texts.push(text);
        }

        Ok(texts)
    }

    /// Tables rebuilt from the positioned text of every page.
    ///
    /// A page whose content stream cannot be decoded is skipped with a
    /// warning; the remaining pages are still scanned.
    pub fn tables(&self) -> Result<Vec<DetectedTable>, ExtractError> {
        let mut tables = Vec::new();

        for (page_number, page_id) in self.doc.get_pages() {
            let content = match self.doc.get_and_decode_page_content(page_id) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping page {} of {}: {}", page_number, self.path.display(), e);
                    continue;
                }
            };

            let encodings = self.font_encodings(page_id);
            let fragments = positioned_fragments(&content.operations, &encodings);
            let lines = group_lines(fragments, self.layout.row_tolerance);
            let found = detect_tables(page_number, lines, self.layout.min_table_columns);

            debug!("Page {}: {} table(s) detected", page_number, found.len());
            tables.extend(found);
        }

        Ok(tables)
    }

    /// Encodings of the fonts a page uses. Fonts whose encoding lopdf cannot
    /// read are left out and their strings fall back to [`decode_pdf_string`].
    fn font_encodings(&self, page_id: ObjectId) -> FontEncodings<'_> {
        let fonts = match self.doc.get_page_fonts(page_id) {
            Ok(fonts) => fonts,
            Err(e) => {
                warn!("Could not read fonts of page {:?}: {}", page_id, e);
                return FontEncodings::new();
            }
        };

        fonts
            .into_iter()
            .filter_map(|(name, font)| match font.get_font_encoding(&self.doc) {
                Ok(encoding) => Some((name, encoding)),
                Err(e) => {
                    debug!("No usable encoding for font {}: {}", String::from_utf8_lossy(&name), e);
                    None
                }
            })
            .collect()
    }

    pub fn release(self) {
        debug!("Released PDF {}", self.path.display());
    }
}

impl TableDocument for PdfDocument {
    fn tables(&self) -> Result<Vec<DetectedTable>, ExtractError> {
        PdfDocument::tables(self)
    }

    fn close(self: Box<Self>) {
        (*self).release();
    }
}

impl TextDocument for PdfDocument {
    fn page_texts(&self) -> Result<Vec<String>, ExtractError> {
        PdfDocument::page_texts(self)
    }

    fn close(self: Box<Self>) {
        (*self).release();
    }
}

/// Text-state tracking needed to place and decode shown strings.
/// Only the translation part of the text matrices is followed.
#[derive(Default)]
struct TextCursor {
    line_x: f32,
    line_y: f32,
    x: f32,
    y: f32,
    leading: f32,
    font: Option<Vec<u8>>,
    font_size: f32,
}

impl TextCursor {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_x += tx;
        self.line_y += ty;
        self.x = self.line_x;
        self.y = self.line_y;
    }

    fn set_line(&mut self, e: f32, f: f32) {
        self.line_x = e;
        self.line_y = f;
        self.x = e;
        self.y = f;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    fn show(&mut self, value: CellValue, out: &mut Vec<TextFragment>) {
        let advance = match &value {
            CellValue::Text(text) => text.chars().count() as f32 * self.font_size * APPROX_GLYPH_WIDTH,
            _ => 0.0,
        };

        let keep = match &value {
            CellValue::Text(text) => !text.trim().is_empty(),
            CellValue::Empty => false,
            CellValue::Unrepresentable => true,
        };

        if keep {
            let value = match value {
                CellValue::Text(text) => CellValue::Text(text.trim().to_string()),
                other => other,
            };
            out.push(TextFragment::new(self.x, self.y, value));
        }

        self.x += advance;
    }
}

fn operand(op: &Operation, index: usize) -> f32 {
    op.operands
        .get(index)
        .and_then(|o| o.as_float().ok())
        .unwrap_or(0.0)
}

/// Walks a page's content operations and returns every shown string with
/// the position it was drawn at, decoded with the encoding of the font
/// selected by the last `Tf`.
pub fn positioned_fragments(operations: &[Operation], encodings: &FontEncodings<'_>) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    let mut cursor = TextCursor::default();

    for op in operations {
        let encoding = cursor.font.as_ref().and_then(|name| encodings.get(name));

        match op.operator.as_str() {
            "BT" => cursor.set_line(0.0, 0.0),
            "Tf" => {
                cursor.font = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .map(<[u8]>::to_vec);
                cursor.font_size = operand(op, 1);
            }
            "TL" => cursor.leading = operand(op, 0),
            "Td" => cursor.move_line(operand(op, 0), operand(op, 1)),
            "TD" => {
                cursor.leading = -operand(op, 1);
                cursor.move_line(operand(op, 0), operand(op, 1));
            }
            "Tm" => cursor.set_line(operand(op, 4), operand(op, 5)),
            "T*" => cursor.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    cursor.show(decode_shown(bytes, encoding), &mut fragments);
                }
            }
            "'" => {
                cursor.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    cursor.show(decode_shown(bytes, encoding), &mut fragments);
                }
            }
            "\"" => {
                cursor.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    cursor.show(decode_shown(bytes, encoding), &mut fragments);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    cursor.show(decode_tj_array(items, encoding), &mut fragments);
                }
            }
            _ => {}
        }
    }

    fragments
}

fn decode_tj_array(items: &[Object], encoding: Option<&Encoding>) -> CellValue {
    let mut value = CellValue::Empty;
    let mut pending_space = false;

    for item in items {
        match item {
            Object::String(bytes, _) => {
                let piece = decode_shown(bytes, encoding);
                value = match (value, piece) {
                    (CellValue::Text(mut acc), CellValue::Text(next)) if pending_space => {
                        acc.push(' ');
                        acc.push_str(&next);
                        CellValue::Text(acc)
                    }
                    (CellValue::Text(mut acc), CellValue::Text(next)) => {
                        acc.push_str(&next);
                        CellValue::Text(acc)
                    }
                    (acc, next) => acc.merge(next),
                };
                pending_space = false;
            }
            other => {
                if let Ok(adjust) = other.as_float() {
                    if adjust < TJ_SPACE_THRESHOLD {
                        pending_space = true;
                    }
                }
            }
        }
    }

    value
}

/// Decodes a shown string with its font's encoding, or with
/// [`decode_pdf_string`] when the font is unknown.
fn decode_shown(bytes: &[u8], encoding: Option<&Encoding>) -> CellValue {
    let Some(encoding) = encoding else {
        return decode_pdf_string(bytes);
    };

    match Document::decode_text(encoding, bytes) {
        Ok(text) => cell_from_text(text),
        Err(e) => {
            debug!("Undecodable string with {:?}: {}", encoding, e);
            CellValue::Unrepresentable
        }
    }
}

/// Decodes a PDF string operand drawn without a known font encoding:
/// UTF-16BE when it starts with a byte order mark, Latin-1 otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> CellValue {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
            .collect();
        match String::from_utf16(&units) {
            Ok(text) => cell_from_text(text),
            Err(_) => CellValue::Unrepresentable,
        }
    } else {
        cell_from_text(bytes.iter().map(|&b| b as char).collect())
    }
}

/// Control characters or replacement marks in decoded text mean the bytes
/// did not map to real characters.
fn cell_from_text(text: String) -> CellValue {
    if text
        .chars()
        .any(|c| (c.is_control() && !c.is_whitespace()) || c == char::REPLACEMENT_CHARACTER)
    {
        return CellValue::Unrepresentable;
    }

    if text.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(text)
    }
}
