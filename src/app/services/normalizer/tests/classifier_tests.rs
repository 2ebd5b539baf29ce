//! Tests for column role classification

use super::super::column_classifier::{alias_score, normalize_label, ColumnClassifier};
use super::text_grid;
use crate::app::models::ColumnRole;
use crate::config::ClassifierConfig;

#[test]
fn test_normalize_label() {
    assert_eq!(normalize_label("EVSE_ID"), "evse id");
    assert_eq!(normalize_label("  Evse Id  "), "evse id");
    assert_eq!(normalize_label("evse-id"), "evse id");
    assert_eq!(normalize_label("VAT%"), "vat");
    assert_eq!(normalize_label("Net Price (EUR)"), "net price eur");
    assert_eq!(normalize_label("***"), "");
}

#[test]
fn test_alias_score_directionality() {
    let aliases = vec!["amount net".to_string(), "net".to_string()];
    // Label containing the whole alias scores high
    assert!(alias_score("net price", &aliases) >= 0.9);
    // A bare "amount" must not count as a net-price hit
    assert!(alias_score("amount", &aliases) < 0.55);
    // Exact match wins outright
    assert_eq!(alias_score("net", &aliases), 1.0);
}

#[test]
fn test_roles_found_regardless_of_order_and_case() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    let grid = text_grid(&[
        &["  vat rate ", "NET PRICE", "Currency", "SESSION_ID", "EVSE-ID"],
        &["21", "10.00", "EUR", "S-1001", "E1"],
        &["21", "12.00", "EUR", "S-1002", "E2"],
    ]);
    let outcome = classifier.classify(&grid, 0);

    assert_eq!(outcome.mapping.get(ColumnRole::EquipmentId), Some(4));
    assert_eq!(outcome.mapping.get(ColumnRole::SessionId), Some(3));
    assert_eq!(outcome.mapping.get(ColumnRole::Currency), Some(2));

    // Price and VAT are collected as candidates, not final assignments
    let candidate_columns: Vec<usize> =
        outcome.price_candidates.iter().map(|c| c.column).collect();
    assert!(candidate_columns.contains(&0));
    assert!(candidate_columns.contains(&1));
    let net = outcome
        .price_candidates
        .iter()
        .find(|c| c.column == 1)
        .unwrap();
    assert!(net.matches_net);
    assert!(!net.matches_gross);
    let vat = outcome
        .price_candidates
        .iter()
        .find(|c| c.column == 0)
        .unwrap();
    assert!(vat.matches_vat);
}

#[test]
fn test_currency_tie_broken_by_content() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    // Two columns both named "Currency"; only one holds currency codes
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Currency"],
        &["E1", "S1", "standard tariff", "EUR"],
        &["E2", "S2", "night tariff", "GBP"],
    ]);
    let outcome = classifier.classify(&grid, 0);
    assert_eq!(outcome.mapping.get(ColumnRole::Currency), Some(3));
}

#[test]
fn test_identifier_tie_broken_by_uniqueness() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    // Two columns named "Session"; identifiers vary row-to-row, labels do not
    let grid = text_grid(&[
        &["EVSE", "Session", "Session", "Currency"],
        &["E1", "weekday", "S-1001", "EUR"],
        &["E2", "weekday", "S-1002", "EUR"],
        &["E3", "weekday", "S-1003", "EUR"],
    ]);
    let outcome = classifier.classify(&grid, 0);
    assert_eq!(outcome.mapping.get(ColumnRole::SessionId), Some(2));
}

#[test]
fn test_equipment_found_by_content_fallback() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    // No equipment-like header name; the identifier-shaped column wins
    let grid = text_grid(&[
        &["Charging Device", "Session ID", "Currency", "Price"],
        &["DE-BMW-001", "S-1001", "EUR", "10.00"],
        &["DE-BMW-002", "S-1002", "EUR", "11.00"],
    ]);
    let outcome = classifier.classify(&grid, 0);
    assert_eq!(outcome.mapping.get(ColumnRole::EquipmentId), Some(0));
}

#[test]
fn test_currency_found_by_content_fallback() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    let grid = text_grid(&[
        &["EVSE", "Session", "Einheit", "Price"],
        &["E1", "S-1001", "EUR", "10.00"],
        &["E2", "S-1002", "EUR", "11.00"],
    ]);
    let outcome = classifier.classify(&grid, 0);
    assert_eq!(outcome.mapping.get(ColumnRole::Currency), Some(2));
}

#[test]
fn test_numeric_columns_never_claimed_by_fallback() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    let grid = text_grid(&[
        &["Foo", "Bar"],
        &["1", "2"],
        &["3", "4"],
    ]);
    let outcome = classifier.classify(&grid, 0);
    assert!(!outcome.mapping.contains(ColumnRole::EquipmentId));
    assert!(!outcome.mapping.contains(ColumnRole::SessionId));
    assert!(!outcome.mapping.contains(ColumnRole::Currency));
}

#[test]
fn test_candidates_exclude_assigned_and_textual_columns() {
    let config = ClassifierConfig::default();
    let classifier = ColumnClassifier::new(&config);
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Price", "Total"],
        &["E1", "S1", "EUR", "10.00", "n/a"],
        &["E2", "S2", "EUR", "11.00", "n/a"],
    ]);
    let outcome = classifier.classify(&grid, 0);
    let candidate_columns: Vec<usize> =
        outcome.price_candidates.iter().map(|c| c.column).collect();
    // "Total" holds no numbers, the text roles are taken
    assert_eq!(candidate_columns, vec![3]);
}
