//! Tests for the full normalization pipeline

use rust_decimal::Decimal;
use std::str::FromStr;

use super::super::FileNormalizer;
use super::text_grid;
use crate::app::models::{FailureStage, NormalizationResult};
use crate::config::Config;

#[test]
fn test_normalize_messy_vendor_file() {
    let config = Config::default();
    let grid = text_grid(&[
        &["Invoice March 2025", "", "", "", "", ""],
        &["", "", "", "", "", ""],
        &["EVSE ID", "Session", "Currency", "Net Amount", "Gross Amount", "VAT"],
        &["E1", "S-1001-abcd", "€", "10,00", "12,10", "21"],
        &["E2", "S-1002-abcd", "€", "20,00", "24,20", "21"],
    ]);
    let result = FileNormalizer::new(&config).normalize(&grid);

    let file = match result {
        NormalizationResult::Normalized(file) => file,
        NormalizationResult::Failed(report) => panic!("unexpected failure: {:?}", report),
    };
    assert_eq!(file.rows.len(), 2);
    assert_eq!(file.skipped_rows, 0);
    assert_eq!(file.rows[0].equipment_id, "E1");
    assert_eq!(file.rows[0].session_id, "S-1001-abcd");
    assert_eq!(file.rows[0].currency, "EUR");
    assert_eq!(file.rows[0].price, Decimal::from_str("10.00").unwrap());
}

#[test]
fn test_headerless_file_fails_at_header_stage() {
    let config = Config::default();
    let grid = text_grid(&[
        &["1", "2", "3"],
        &["4", "5", "6"],
    ]);
    let result = FileNormalizer::new(&config).normalize(&grid);
    match result {
        NormalizationResult::Failed(report) => {
            assert_eq!(report.stage, FailureStage::Header);
            assert_eq!(report.file_name, "test.csv");
            assert!(!report.reason.is_empty());
        }
        other => panic!("expected header failure, got {:?}", other),
    }
}

#[test]
fn test_missing_mandatory_role_fails_classification() {
    let config = Config::default();
    // Header-like row but no equipment, session or currency column anywhere
    let grid = text_grid(&[
        &["Total", "Price", "Fee"],
        &["1.00", "2.00", "3.00"],
        &["4.00", "5.00", "6.00"],
    ]);
    let result = FileNormalizer::new(&config).normalize(&grid);
    match result {
        NormalizationResult::Failed(report) => {
            assert_eq!(report.stage, FailureStage::Classification);
            assert!(report.reason.contains("equipment id"));
        }
        other => panic!("expected classification failure, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_price_fails_price_stage() {
    let config = Config::default();
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Amount", "Amount"],
        &["E1", "S1", "EUR", "50.00", "50.00"],
        &["E2", "S2", "EUR", "60.00", "60.00"],
    ]);
    let result = FileNormalizer::new(&config).normalize(&grid);
    match result {
        NormalizationResult::Failed(report) => {
            assert_eq!(report.stage, FailureStage::Price);
            assert!(report.reason.contains("Amount"));
        }
        other => panic!("expected price failure, got {:?}", other),
    }
}

#[test]
fn test_normalization_is_idempotent() {
    let config = Config::default();
    let grid = text_grid(&[
        &["EVSE ID", "Session ID", "Currency", "Net Price", "VAT Rate"],
        &["E1", "S1", "EUR", "10.00", "21"],
        &["E2", "", "EUR", "11.00", "21"],
    ]);
    let normalizer = FileNormalizer::new(&config);
    let first = normalizer.normalize(&grid);
    let second = normalizer.normalize(&grid);
    assert_eq!(first, second);
}

#[test]
fn test_skipped_rows_tallied_not_failed() {
    let config = Config::default();
    let grid = text_grid(&[
        &["EVSE ID", "Session ID", "Currency", "Net Price"],
        &["E1", "S1", "EUR", "10.00"],
        &["E2", "", "EUR", "11.00"],
    ]);
    let result = FileNormalizer::new(&config).normalize(&grid);
    match result {
        NormalizationResult::Normalized(file) => {
            assert_eq!(file.rows.len(), 1);
            assert_eq!(file.data_rows, 2);
            assert_eq!(file.skipped_rows, 1);
        }
        other => panic!("expected success with skips, got {:?}", other),
    }
}

#[test]
fn test_vat_rate_recorded_in_mapping_analysis() {
    let config = Config::default();
    let grid = text_grid(&[
        &["EVSE ID", "Session ID", "Currency", "Net Price", "VAT Rate"],
        &["E1", "S1", "EUR", "10.00", "21"],
    ]);
    let normalizer = FileNormalizer::new(&config);
    let (header, outcome, price) = normalizer.analyze(&grid).unwrap();
    assert_eq!(header.row, 0);
    assert_eq!(outcome.mapping.len(), 3);
    let resolved = price.unwrap();
    assert_eq!(resolved.price_column, 3);
    assert_eq!(resolved.vat_column, Some(4));
}
