//! Spreadsheet output.
//!
//! Records are first flattened into a [`SheetLayout`] (pure, easy to test),
//! then rendered into xlsx bytes. List-valued fields expand downwards: each
//! element gets its own row in the field's column, and the next record
//! starts below the tallest field of the previous one.

use crate::domain::model::{CellKind, FieldValue, LayoutCell, Record, SheetLayout};
use crate::utils::error::Result;
use regex::Regex;
use rust_xlsxwriter::{Format, Url, Workbook};
use std::sync::LazyLock;
use uuid::Uuid;

pub const COLUMN_WIDTH: f64 = 50.0;
const MAX_SHEET_NAME_CHARS: usize = 31;
/// Longest string an xlsx cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

const SHEET_NAME_RESERVED: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const FILENAME_RESERVED: &[char] = &['[', ']', ':', '*', '?', '/', '\\', '"', '<', '>', '|'];

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("valid url regex"));

pub fn is_href(text: &str) -> bool {
    URL_PATTERN.is_match(text)
}

fn is_illegal_char(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}'..='\u{0C}' | '\u{0E}'..='\u{1F}')
}

/// Removes control characters that the xlsx format cannot store.
pub fn strip_illegal_chars(text: &str) -> String {
    text.chars().filter(|c| !is_illegal_char(*c)).collect()
}

fn replace_reserved(text: &str, reserved: &[char]) -> String {
    strip_illegal_chars(text)
        .chars()
        .map(|c| if reserved.contains(&c) { '_' } else { c })
        .collect()
}

pub fn sheet_name(name: &str) -> String {
    let cleaned = replace_reserved(name, SHEET_NAME_RESERVED);
    let cleaned: String = cleaned
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();

    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// `<basename>_<6 hex chars>.xlsx`, with path separators and other
/// reserved characters in the basename replaced by `_`.
pub fn workbook_filename(basename: &str) -> String {
    let basename = replace_reserved(basename, FILENAME_RESERVED);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}.xlsx", basename.trim(), &suffix[..6])
}

fn layout_cell(row: u32, col: u16, raw: &str) -> Option<LayoutCell> {
    if raw.is_empty() {
        return None;
    }
    let mut value = strip_illegal_chars(raw);
    if let Some((cut, _)) = value.char_indices().nth(MAX_CELL_CHARS) {
        tracing::warn!(
            "⚠️ Cell ({}, {}) holds {} chars, truncated to {}",
            row,
            col,
            value.chars().count(),
            MAX_CELL_CHARS
        );
        value.truncate(cut);
    }
    let kind = if is_href(&value) {
        CellKind::Url
    } else {
        CellKind::Text
    };
    Some(LayoutCell {
        row,
        col,
        value,
        kind,
    })
}

pub fn layout_records(name: &str, header: &[String], records: &[Record]) -> SheetLayout {
    let mut cells = Vec::new();
    let mut base_row: u32 = 1;

    for record in records {
        for (col, value) in record.values.iter().enumerate() {
            let col = col as u16;
            match value {
                FieldValue::Scalar(Some(text)) => cells.extend(layout_cell(base_row, col, text)),
                FieldValue::Scalar(None) => {}
                FieldValue::List(items) => {
                    for (offset, item) in items.iter().enumerate() {
                        if let Some(text) = item {
                            cells.extend(layout_cell(base_row + offset as u32, col, text));
                        }
                    }
                }
            }
        }
        base_row += record.height() as u32;
    }

    SheetLayout {
        sheet_name: sheet_name(name),
        header: header.to_vec(),
        cells,
        record_count: records.len(),
    }
}

/// Renders the layout into an in-memory xlsx file.
pub fn render_workbook(layout: &SheetLayout) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&layout.sheet_name)?;

        for (col, name) in layout.header.iter().enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, strip_illegal_chars(name), &header_format)?;
            sheet.set_column_width(col, COLUMN_WIDTH)?;
        }

        for cell in &layout.cells {
            match cell.kind {
                CellKind::Text => {
                    sheet.write_string(cell.row, cell.col, &cell.value)?;
                }
                CellKind::Url => {
                    let outcome = sheet
                        .write_url(cell.row, cell.col, Url::new(cell.value.as_str()))
                        .map(|_| ());
                    if let Err(e) = outcome {
                        tracing::warn!("⚠️ Writing {} as text: {}", cell.value, e);
                        sheet.write_string(cell.row, cell.col, &cell.value)?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
