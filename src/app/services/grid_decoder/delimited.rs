//! CSV decoding with encoding and delimiter detection
//!
//! Vendor exports arrive in whatever encoding and delimiter the billing
//! system happened to use, so both are detected from the bytes: UTF-8 first
//! with a Windows-1252 fallback, and the delimiter by scoring candidates
//! for consistent per-line field counts over the leading lines.

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use crate::app::models::{FileFormat, Grid, RawCell};
use crate::{Error, Result};

/// Delimiters considered during sniffing
const DELIMITER_CANDIDATES: &[u8] = b",;\t|";

/// Number of leading non-empty lines inspected by the sniffer
const SNIFF_LINES: usize = 20;

/// Decode CSV bytes into a grid
pub fn decode_bytes(bytes: &[u8], file_name: String) -> Result<Grid> {
    let text = decode_text(bytes);
    let delimiter = sniff_delimiter(&text);
    debug!(
        file = %file_name,
        delimiter = %char::from(delimiter),
        "decoding delimited file"
    );

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| Error::csv_parsing(&file_name, "malformed CSV record", Some(e)))?;
        rows.push(record.iter().map(cell_from_field).collect());
    }

    Ok(Grid::new(file_name, FileFormat::Csv, rows))
}

/// Decode bytes as UTF-8, falling back to Windows-1252 (covers the Latin-1
/// exports some billing systems still produce)
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn cell_from_field(field: &str) -> RawCell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        RawCell::Empty
    } else {
        RawCell::Text(trimmed.to_string())
    }
}

/// Pick the delimiter whose per-line occurrence count is highest and most
/// consistent over the leading lines; comma wins when nothing scores.
fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = (b',', 0.0f64);
    for &candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == candidate).count())
            .collect();
        let min = counts.iter().copied().min().unwrap_or(0);
        if min == 0 {
            continue;
        }
        let max = counts.iter().copied().max().unwrap_or(0);
        let consistency = min as f64 / max as f64;
        let score = consistency * min as f64;
        if score > best.1 {
            best = (candidate, score);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_comma_csv() {
        let bytes = b"EVSE,Session,Currency,Net\nE1,S1,EUR,10.00\n";
        let grid = decode_bytes(bytes, "a.csv".to_string()).unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell(0, 0), Some(&RawCell::Text("EVSE".into())));
        assert_eq!(grid.cell(1, 3), Some(&RawCell::Text("10.00".into())));
    }

    #[test]
    fn test_sniffs_semicolon_delimiter() {
        let bytes = b"EVSE;Session;Currency\nE1;S1;EUR\nE2;S2;EUR\n";
        let grid = decode_bytes(bytes, "a.csv".to_string()).unwrap();
        assert_eq!(grid.cell(0, 1), Some(&RawCell::Text("Session".into())));
        assert_eq!(grid.cell(2, 2), Some(&RawCell::Text("EUR".into())));
    }

    #[test]
    fn test_sniffs_tab_delimiter() {
        let bytes = b"EVSE\tSession\nE1\tS1\n";
        let grid = decode_bytes(bytes, "a.csv".to_string()).unwrap();
        assert_eq!(grid.cell(1, 1), Some(&RawCell::Text("S1".into())));
    }

    #[test]
    fn test_defaults_to_comma_without_signal() {
        assert_eq!(sniff_delimiter("justonecolumn\nanother\n"), b',');
    }

    #[test]
    fn test_empty_cells_and_ragged_rows() {
        let bytes = b"a,b,c\n1,,3\nonly\n";
        let grid = decode_bytes(bytes, "a.csv".to_string()).unwrap();
        assert_eq!(grid.cell(1, 1), Some(&RawCell::Empty));
        assert_eq!(grid.rows[2].len(), 1);
        assert_eq!(grid.column_count(), 3);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Währung" (German for currency) encoded in Windows-1252
        let bytes = b"W\xe4hrung,Preis\nEUR,10\n";
        let grid = decode_bytes(bytes, "a.csv".to_string()).unwrap();
        assert_eq!(grid.cell(0, 0), Some(&RawCell::Text("Währung".into())));
    }
}
