//! Decoding of raw invoice exports into untyped cell grids
//!
//! This module is the boundary between file bytes and the reconciliation
//! core: every supported format ends up as the same [`Grid`] of raw cells,
//! so the detection stages never see format-specific structure.
//!
//! ## Architecture
//!
//! - [`delimited`] - CSV decoding with encoding and delimiter detection
//! - [`workbook`] - XLSX/XLS/ODS decoding via calamine

pub mod delimited;
pub mod workbook;

use std::path::Path;

use crate::app::models::{FileFormat, Grid};
use crate::constants::SUPPORTED_EXTENSIONS;
use crate::{Error, Result};

/// Decode one named file into a grid, choosing the decoder by extension
pub fn decode_path(path: &Path) -> Result<Grid> {
    let file_name = display_name(path);
    match detect_format(path)? {
        FileFormat::Csv => {
            let bytes = std::fs::read(path)
                .map_err(|e| Error::io(format!("failed to read '{}'", path.display()), e))?;
            delimited::decode_bytes(&bytes, file_name)
        }
        format => workbook::decode_path(path, file_name, format),
    }
}

/// Map a file extension onto the decoder format tag
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => Ok(FileFormat::Csv),
        "xlsx" | "xlsm" => Ok(FileFormat::Xlsx),
        "xls" => Ok(FileFormat::Xls),
        "ods" => Ok(FileFormat::Ods),
        _ => Err(Error::unsupported_format(display_name(path), extension)),
    }
}

/// Whether the path carries an extension the decoder handles
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
