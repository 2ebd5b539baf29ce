//! Data models for invoice reconciliation
//!
//! This module contains the core data structures for representing decoded
//! invoice grids, column classifications and the canonical output table.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Raw Grid Structures
// =============================================================================

/// Tabular source format tag, matching what the decoder supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Xlsx => "XLSX",
            FileFormat::Xls => "XLS",
            FileFormat::Ods => "ODS",
        };
        write!(f, "{}", name)
    }
}

/// One untyped cell of a decoded grid
///
/// CSV decoding produces only `Text` and `Empty`; workbook decoding preserves
/// natively-typed numeric cells as `Number`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Empty,
}

impl RawCell {
    /// Whether the cell carries no usable value
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(t) => t.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    /// Render the cell as display text. Integral numbers render without a
    /// trailing `.0` (so a numeric session id `3.0` becomes `"3"`).
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(t) => {
                let trimmed = t.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            RawCell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
        }
    }

    /// Numeric interpretation of the cell, if any
    ///
    /// Text cells go through the tolerant money parser, so decimal commas and
    /// thousands separators count as numeric.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            RawCell::Empty => None,
            RawCell::Number(n) => Some(*n),
            RawCell::Text(t) => parse_decimal_text(t).and_then(|d| d.to_f64()),
        }
    }

    /// Decimal interpretation of the cell, if any
    pub fn decimal_value(&self) -> Option<Decimal> {
        match self {
            RawCell::Empty => None,
            RawCell::Number(n) => Decimal::from_f64(*n),
            RawCell::Text(t) => parse_decimal_text(t),
        }
    }
}

/// Parse a numeric value out of invoice cell text.
///
/// Handles decimal commas ("10,50"), mixed thousands/decimal separators
/// ("1.234,56" and "1,234.56") and embedded currency symbols ("€ 12.00").
/// Any alphabetic character disqualifies the cell: identifiers like "E1" or
/// "EVSE-001" must never read as numbers. Returns `None` when no clean
/// numeric interpretation exists.
pub fn parse_decimal_text(text: &str) -> Option<Decimal> {
    if text.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();
    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        // Both separators present: the rightmost one is the decimal separator
        (Some(dot), Some(comma)) if dot > comma => cleaned.replace(',', ""),
        (Some(_), Some(_)) => cleaned.replace('.', "").replace(',', "."),
        // Comma only: a single comma followed by a non-3-digit group is a
        // decimal comma, anything else is thousands grouping
        (None, Some(comma)) => {
            let trailing = cleaned.len() - comma - 1;
            if commas == 1 && trailing != 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        // Dot only: repeated dots are European thousands grouping
        (Some(_), None) if dots > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// One decoded file as an immutable 2-D grid of raw cells
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub file_name: String,
    pub format: FileFormat,
    pub rows: Vec<Vec<RawCell>>,
}

impl Grid {
    pub fn new(file_name: impl Into<String>, format: FileFormat, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row width; rows may be ragged
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&RawCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Rows strictly after the header row
    pub fn data_rows(&self, header_row: usize) -> &[Vec<RawCell>] {
        if header_row + 1 >= self.rows.len() {
            &[]
        } else {
            &self.rows[header_row + 1..]
        }
    }
}

// =============================================================================
// Column Classification Structures
// =============================================================================

/// Canonical role a raw column can be mapped to
///
/// Unclassified columns are simply absent from the [`ColumnMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    EquipmentId,
    SessionId,
    Currency,
    Price,
    VatRate,
}

impl ColumnRole {
    /// The three roles a file cannot be normalized without
    pub const MANDATORY: &'static [ColumnRole] = &[
        ColumnRole::EquipmentId,
        ColumnRole::SessionId,
        ColumnRole::Currency,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::EquipmentId => "equipment id",
            ColumnRole::SessionId => "session id",
            ColumnRole::Currency => "currency",
            ColumnRole::Price => "price",
            ColumnRole::VatRate => "vat rate",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Role-to-column mapping for one file, finalized by the normalizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    roles: HashMap<ColumnRole, usize>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a role to a column. Returns false (and leaves the mapping
    /// unchanged) when the role is already taken.
    pub fn assign(&mut self, role: ColumnRole, column: usize) -> bool {
        if self.roles.contains_key(&role) {
            return false;
        }
        self.roles.insert(role, column);
        true
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        self.roles.get(&role).copied()
    }

    pub fn contains(&self, role: ColumnRole) -> bool {
        self.roles.contains_key(&role)
    }

    /// Whether the column index is already mapped to some role
    pub fn is_assigned_column(&self, column: usize) -> bool {
        self.roles.values().any(|&c| c == column)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, usize)> + '_ {
        self.roles.iter().map(|(&role, &col)| (role, col))
    }
}

// =============================================================================
// Canonical Output Structures
// =============================================================================

/// One normalized invoice line in the canonical schema
///
/// Invariant: `price` is always the net (pre-VAT) amount, never gross.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRow {
    pub equipment_id: String,
    pub session_id: String,
    /// Uppercased ISO-4217-like code
    pub currency: String,
    pub price: Decimal,
}

/// Pipeline stage at which a file failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Header,
    Classification,
    Price,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Header => "header",
            FailureStage::Classification => "classification",
            FailureStage::Price => "price",
        };
        write!(f, "{}", name)
    }
}

/// Structured, display-ready account of why a file contributed no rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub file_name: String,
    pub stage: FailureStage,
    pub reason: String,
}

impl FailureReport {
    pub fn new(
        file_name: impl Into<String>,
        stage: FailureStage,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            stage,
            reason: reason.into(),
        }
    }
}

/// Successful normalization of one file
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFile {
    pub file_name: String,
    pub rows: Vec<CanonicalRow>,
    /// Total data rows inspected (rows after the header row)
    pub data_rows: usize,
    /// Rows dropped because a mandatory field was empty or unparseable
    pub skipped_rows: usize,
}

/// Outcome of normalizing one file: canonical rows or a structured failure
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationResult {
    Normalized(NormalizedFile),
    Failed(FailureReport),
}

/// Per-file row accounting carried into the merge report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub file_name: String,
    pub rows_emitted: usize,
    pub rows_skipped: usize,
}

/// Final merged table plus the failure report, immutable once returned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedOutput {
    /// Canonical rows in file-input order, original row order within each file
    pub rows: Vec<CanonicalRow>,
    /// One summary per successfully normalized file, in input order
    pub summaries: Vec<FileSummary>,
    /// One report per failed file, in input order
    pub failures: Vec<FailureReport>,
}

impl MergedOutput {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failures.is_empty()
    }
}
