//! Net-price disambiguation among monetary candidate columns
//!
//! Column names alone cannot reliably separate net price, gross price and
//! VAT-rate columns across vendors. Resolution applies a fixed rule order
//! and the first rule that yields a unique answer wins; when nothing does,
//! resolution fails rather than guessing a gross price as net.

use std::collections::HashSet;
use tracing::debug;

use super::column_classifier::PriceCandidate;
use crate::app::models::{Grid, RawCell};
use crate::config::PriceConfig;
use crate::{Error, Result};

/// Fraction of comparable rows that must satisfy the net/gross ratio
const MIN_RATIO_AGREEMENT: f64 = 0.8;

/// Price resolution verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub price_column: usize,
    /// VAT-rate column identified along the way, if any
    pub vat_column: Option<usize>,
}

/// Pick the net-price column among the candidates, or fail with
/// `AmbiguousPrice` naming the tied (or absent) candidate headers.
pub fn resolve(
    grid: &Grid,
    header_row: usize,
    candidates: &[PriceCandidate],
    config: &PriceConfig,
    sample_size: usize,
) -> Result<ResolvedPrice> {
    if candidates.is_empty() {
        return Err(Error::ambiguous_price(Vec::new()));
    }

    let samples: Vec<CandidateSample> = candidates
        .iter()
        .map(|c| CandidateSample::collect(grid, header_row, c.column, sample_size))
        .collect();
    let vat_flags: Vec<bool> = candidates
        .iter()
        .zip(&samples)
        .map(|(candidate, sample)| is_vat_column(candidate, sample, config))
        .collect();
    let vat_indices: Vec<usize> = (0..candidates.len()).filter(|&i| vat_flags[i]).collect();
    let first_vat = vat_indices.first().map(|&i| candidates[i].column);

    // Rule 1: a single candidate named exclusively as net
    let net_named: Vec<&PriceCandidate> = candidates
        .iter()
        .filter(|c| c.matches_net && !c.matches_gross && !c.matches_vat)
        .collect();
    if net_named.len() == 1 {
        debug!(column = net_named[0].column, "price resolved by net-price naming");
        return Ok(ResolvedPrice {
            price_column: net_named[0].column,
            vat_column: first_vat,
        });
    }

    // Rule 2: exclude VAT-rate columns; a single survivor wins, unless it is
    // gross-named. A gross column must never be emitted as the net price.
    let remaining: Vec<usize> = (0..candidates.len()).filter(|&i| !vat_flags[i]).collect();
    if remaining.len() == 1 {
        let sole = &candidates[remaining[0]];
        if sole.matches_gross && !sole.matches_net {
            return Err(Error::ambiguous_price(vec![sole.header.clone()]));
        }
        debug!(column = sole.column, "price resolved after VAT-rate exclusion");
        return Ok(ResolvedPrice {
            price_column: sole.column,
            vat_column: first_vat,
        });
    }

    // Rule 3: row-wise net/gross ratio against a detected VAT column
    if remaining.len() >= 2 {
        for &vat_idx in &vat_indices {
            let vat_column = candidates[vat_idx].column;
            let mut net_side: HashSet<usize> = HashSet::new();
            let mut gross_side: HashSet<usize> = HashSet::new();
            for &a in &remaining {
                for &b in &remaining {
                    if a == b {
                        continue;
                    }
                    if ratio_consistent(
                        grid,
                        header_row,
                        candidates[a].column,
                        candidates[b].column,
                        vat_column,
                        config,
                        sample_size,
                    ) {
                        net_side.insert(a);
                        gross_side.insert(b);
                    }
                }
            }
            let winners: Vec<usize> = net_side.difference(&gross_side).copied().collect();
            if winners.len() == 1 {
                debug!(
                    column = candidates[winners[0]].column,
                    vat_column, "price resolved by net/gross ratio"
                );
                return Ok(ResolvedPrice {
                    price_column: candidates[winners[0]].column,
                    vat_column: Some(vat_column),
                });
            }
        }
    }

    // Rule 4: refuse to guess
    let tied: Vec<String> = if remaining.is_empty() {
        candidates.iter().map(|c| c.header.clone()).collect()
    } else {
        remaining
            .iter()
            .map(|&i| candidates[i].header.clone())
            .collect()
    };
    Err(Error::ambiguous_price(tied))
}

/// Numeric sample of one candidate column, with the shape details VAT
/// detection needs
#[derive(Debug, Clone)]
struct CandidateSample {
    values: Vec<f64>,
    /// Whether any sampled value rendered with an explicit decimal part;
    /// "100.00" signals money even when the value is integral
    any_decimal_rendering: bool,
    distinct: usize,
}

impl CandidateSample {
    fn collect(grid: &Grid, header_row: usize, col: usize, limit: usize) -> Self {
        let mut values = Vec::new();
        let mut any_decimal_rendering = false;
        let mut distinct: HashSet<u64> = HashSet::new();
        for row in grid.data_rows(header_row) {
            let Some(cell) = row.get(col) else { continue };
            let Some(value) = cell.numeric_value() else { continue };
            match cell {
                RawCell::Text(text) => {
                    if text.contains('.') || text.contains(',') {
                        any_decimal_rendering = true;
                    }
                }
                RawCell::Number(n) => {
                    if n.fract() != 0.0 {
                        any_decimal_rendering = true;
                    }
                }
                RawCell::Empty => {}
            }
            distinct.insert(value.to_bits());
            values.push(value);
            if values.len() >= limit {
                break;
            }
        }
        Self {
            values,
            any_decimal_rendering,
            distinct: distinct.len(),
        }
    }
}

/// Whether a candidate is a VAT-rate column.
///
/// A VAT name match plus in-range values suffices. Name-neutral columns need
/// the stronger percentage shape: whole numbers without decimal rendering and
/// the few distinct values typical of tax rates. Plain price columns vary
/// row to row and carry decimal parts.
fn is_vat_column(candidate: &PriceCandidate, sample: &CandidateSample, config: &PriceConfig) -> bool {
    if sample.values.is_empty() {
        return candidate.matches_vat;
    }
    let in_range = sample
        .values
        .iter()
        .all(|v| (config.vat_rate_min..=config.vat_rate_max).contains(v));
    if !in_range {
        return false;
    }
    if candidate.matches_vat {
        return true;
    }
    let integral = sample.values.iter().all(|v| v.fract() == 0.0);
    integral && !sample.any_decimal_rendering && sample.distinct <= 3
}

/// Row-wise test that `gross ≈ net * (1 + vat/100)` within the configured
/// relative tolerance
fn ratio_consistent(
    grid: &Grid,
    header_row: usize,
    net_col: usize,
    gross_col: usize,
    vat_col: usize,
    config: &PriceConfig,
    sample_size: usize,
) -> bool {
    let mut compared = 0usize;
    let mut hits = 0usize;
    for row in grid.data_rows(header_row) {
        let net = row.get(net_col).and_then(|c| c.numeric_value());
        let gross = row.get(gross_col).and_then(|c| c.numeric_value());
        let vat = row.get(vat_col).and_then(|c| c.numeric_value());
        let (Some(net), Some(gross), Some(vat)) = (net, gross, vat) else {
            continue;
        };
        if net <= 0.0 || gross <= 0.0 || vat < 0.0 {
            continue;
        }
        let expected = net * (1.0 + vat / 100.0);
        compared += 1;
        if ((gross - expected) / expected).abs() <= config.vat_ratio_tolerance {
            hits += 1;
        }
        if compared >= sample_size {
            break;
        }
    }
    compared >= config.min_ratio_rows && hits as f64 / compared as f64 >= MIN_RATIO_AGREEMENT
}
