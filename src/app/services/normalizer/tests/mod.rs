//! Unit tests for the normalization pipeline

mod classifier_tests;
mod normalizer_tests;
mod resolver_tests;

use crate::app::models::{FileFormat, Grid, RawCell};

/// Build a text-only grid the way the CSV decoder would produce it
pub fn text_grid(rows: &[&[&str]]) -> Grid {
    let rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(cell.trim().to_string())
                    }
                })
                .collect()
        })
        .collect();
    Grid::new("test.csv", FileFormat::Csv, rows)
}
