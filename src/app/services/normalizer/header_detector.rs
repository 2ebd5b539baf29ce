//! Header row detection inside arbitrary sheets
//!
//! Vendor exports bury their column headers under titles, addresses and
//! blank rows. Each leading row is scored on how header-like it looks;
//! the best eligible row wins, and a sheet with no eligible row fails
//! rather than silently falling back to row 0.

use std::collections::HashSet;
use tracing::debug;

use super::column_classifier::normalize_label;
use crate::app::models::{Grid, RawCell};
use crate::config::{AliasTables, HeaderConfig};
use crate::constants::HEADER_KEYWORDS;
use crate::{Error, Result};

/// A candidate header row with its composite score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderCandidate {
    pub row: usize,
    pub score: f64,
}

// Composite score weights. Textual content and known vocabulary dominate;
// density and label uniqueness refine.
const NON_EMPTY_WEIGHT: f64 = 0.30;
const TEXTUAL_WEIGHT: f64 = 0.35;
const KEYWORD_WEIGHT: f64 = 0.25;
const UNIQUE_WEIGHT: f64 = 0.10;

/// Find the most header-like row within the scan window.
///
/// Returns `NoHeaderFound` when no row clears the minimum non-empty and
/// textual fractions; a header-less sheet must fail, not misread.
pub fn detect(grid: &Grid, config: &HeaderConfig, aliases: &AliasTables) -> Result<HeaderCandidate> {
    let width = grid.column_count();
    let window = config.scan_window.min(grid.row_count());
    if width == 0 || window == 0 {
        return Err(Error::no_header_found(window));
    }

    let keywords = keyword_set(aliases);

    let mut best: Option<HeaderCandidate> = None;
    for (row_idx, row) in grid.rows.iter().take(window).enumerate() {
        let Some(score) = score_row(row, width, &keywords, config) else {
            continue;
        };
        // Strictly-greater keeps the earliest row on ties
        if best.map_or(true, |b| score > b.score) {
            best = Some(HeaderCandidate {
                row: row_idx,
                score,
            });
        }
    }

    match best {
        Some(candidate) => {
            debug!(row = candidate.row, score = candidate.score, "header row selected");
            Ok(candidate)
        }
        None => Err(Error::no_header_found(window)),
    }
}

/// Score one row, or `None` when it misses the eligibility thresholds
fn score_row(
    row: &[RawCell],
    width: usize,
    keywords: &HashSet<String>,
    config: &HeaderConfig,
) -> Option<f64> {
    let mut non_empty = 0usize;
    let mut textual = 0usize;
    let mut keyword_hits = 0usize;
    let mut labels: HashSet<String> = HashSet::new();
    let mut duplicated = false;

    for cell in row {
        if cell.is_empty() {
            continue;
        }
        non_empty += 1;
        if cell.numeric_value().is_none() {
            textual += 1;
        }
        if let Some(text) = cell.to_display_string() {
            let label = normalize_label(&text);
            if !label.is_empty() {
                if !labels.insert(label.clone()) {
                    duplicated = true;
                }
                if matches_keyword(&label, keywords) {
                    keyword_hits += 1;
                }
            }
        }
    }

    if non_empty == 0 {
        return None;
    }
    let non_empty_fraction = non_empty as f64 / width as f64;
    let textual_fraction = textual as f64 / non_empty as f64;
    if non_empty_fraction < config.min_non_empty_fraction
        || textual_fraction < config.min_textual_fraction
    {
        return None;
    }

    let keyword_fraction = keyword_hits as f64 / non_empty as f64;
    let unique = if duplicated { 0.0 } else { 1.0 };
    Some(
        NON_EMPTY_WEIGHT * non_empty_fraction
            + TEXTUAL_WEIGHT * textual_fraction
            + KEYWORD_WEIGHT * keyword_fraction
            + UNIQUE_WEIGHT * unique,
    )
}

/// Configured role aliases plus generic invoice vocabulary, as whole phrases
/// and as single tokens
fn keyword_set(aliases: &AliasTables) -> HashSet<String> {
    let mut keywords: HashSet<String> = HashSet::new();
    for alias in aliases.all().chain(HEADER_KEYWORDS.iter().copied()) {
        let normalized = normalize_label(alias);
        for token in normalized.split(' ') {
            if token.len() > 1 {
                keywords.insert(token.to_string());
            }
        }
        if !normalized.is_empty() {
            keywords.insert(normalized);
        }
    }
    keywords
}

fn matches_keyword(label: &str, keywords: &HashSet<String>) -> bool {
    if keywords.contains(label) {
        return true;
    }
    label.split(' ').any(|token| keywords.contains(token))
}
