//! Projection of raw data rows into canonical rows
//!
//! Runs after the mapping is final. Rows missing any mandatory value are
//! skipped and tallied, never turned into failures.

use rust_decimal::Decimal;

use super::stats::ProjectionStats;
use crate::app::models::{CanonicalRow, Grid, RawCell};
use crate::constants::CURRENCY_SYMBOLS;

/// Final column indices the projector reads from, one per canonical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionPlan {
    pub equipment: usize,
    pub session: usize,
    pub currency: usize,
    pub price: usize,
}

/// Project every data row into the canonical schema
pub fn project(grid: &Grid, header_row: usize, plan: &ProjectionPlan) -> (Vec<CanonicalRow>, ProjectionStats) {
    let mut rows = Vec::new();
    let mut stats = ProjectionStats::new();

    for row in grid.data_rows(header_row) {
        stats.data_rows += 1;

        let equipment_id = text_field(row, plan.equipment);
        let session_id = text_field(row, plan.session);
        let currency = text_field(row, plan.currency).map(|raw| normalize_currency(&raw));
        let price = price_field(row, plan.price);

        match (equipment_id, session_id, currency, price) {
            (Some(equipment_id), Some(session_id), Some(currency), Some(price))
                if !currency.is_empty() =>
            {
                rows.push(CanonicalRow {
                    equipment_id,
                    session_id,
                    currency,
                    price,
                });
            }
            _ => stats.rows_skipped += 1,
        }
    }

    (rows, stats)
}

fn text_field(row: &[RawCell], col: usize) -> Option<String> {
    row.get(col)
        .and_then(|cell| cell.to_display_string())
        .filter(|s| !s.is_empty())
}

fn price_field(row: &[RawCell], col: usize) -> Option<Decimal> {
    row.get(col).and_then(|cell| cell.decimal_value())
}

/// Uppercase a currency value, mapping recognized symbols to ISO codes
pub fn normalize_currency(raw: &str) -> String {
    let trimmed = raw.trim();
    for (symbol, code) in CURRENCY_SYMBOLS {
        if trimmed == *symbol {
            return (*code).to_string();
        }
    }
    trimmed.to_uppercase()
}
