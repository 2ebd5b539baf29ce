//! Excel and OpenDocument decoding via calamine
//!
//! Only the first worksheet is read: invoice exports put the line items
//! there, and the schema-inference stages handle everything else.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

use crate::app::models::{FileFormat, Grid, RawCell};
use crate::{Error, Result};

/// Decode the first worksheet of a workbook file into a grid
pub fn decode_path(path: &Path, file_name: String, format: FileFormat) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::decode(&file_name, format!("failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::decode(&file_name, "workbook contains no worksheets"))?
        .map_err(|e| {
            Error::decode(&file_name, format!("failed to read first worksheet: {}", e))
        })?;

    let mut rows = Vec::with_capacity(range.height());
    for row in range.rows() {
        rows.push(row.iter().map(cell_from_data).collect());
    }
    debug!(file = %file_name, rows = rows.len(), "decoded workbook sheet");

    Ok(Grid::new(file_name, format, rows))
}

/// Map a calamine cell onto a raw grid cell, keeping native numbers numeric
fn cell_from_data(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                RawCell::Empty
            } else {
                RawCell::Text(trimmed.to_string())
            }
        }
        Data::Float(n) => RawCell::Number(*n),
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Bool(b) => RawCell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => RawCell::Text(format!("#{:?}", e)),
        // Serial date values stay numeric; the classifier treats them as
        // non-textual data, which is what matters for detection
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}
