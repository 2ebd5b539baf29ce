//! Tests for net-price resolution

use super::super::column_classifier::PriceCandidate;
use super::super::price_resolver::resolve;
use super::text_grid;
use crate::config::PriceConfig;
use crate::Error;

fn candidate(column: usize, header: &str, net: bool, gross: bool, vat: bool) -> PriceCandidate {
    PriceCandidate {
        column,
        header: header.to_string(),
        matches_net: net,
        matches_gross: gross,
        matches_vat: vat,
    }
}

#[test]
fn test_net_named_column_selected_over_gross() {
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Price Gross", "Price Net", "VAT Rate"],
        &["E1", "S1", "EUR", "121.00", "100.00", "21"],
    ]);
    let candidates = vec![
        candidate(3, "Price Gross", false, true, false),
        candidate(4, "Price Net", true, false, false),
        candidate(5, "VAT Rate", false, false, true),
    ];
    let resolved = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10).unwrap();
    assert_eq!(resolved.price_column, 4);
    assert_eq!(resolved.vat_column, Some(5));
}

#[test]
fn test_single_survivor_after_vat_exclusion() {
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Amount", "VAT Rate"],
        &["E1", "S1", "EUR", "10.50", "21"],
        &["E2", "S2", "EUR", "12.00", "21"],
    ]);
    let candidates = vec![
        candidate(3, "Amount", false, false, false),
        candidate(4, "VAT Rate", false, false, true),
    ];
    let resolved = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10).unwrap();
    assert_eq!(resolved.price_column, 3);
    assert_eq!(resolved.vat_column, Some(4));
}

#[test]
fn test_single_candidate_selected() {
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Price"],
        &["E1", "S1", "EUR", "10.00"],
    ]);
    let candidates = vec![candidate(3, "Price", false, false, false)];
    let resolved = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10).unwrap();
    assert_eq!(resolved.price_column, 3);
    assert_eq!(resolved.vat_column, None);
}

#[test]
fn test_ratio_rule_picks_net_among_neutral_names() {
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Amount", "Total", "VAT Rate"],
        &["E1", "S1", "EUR", "100.00", "121.00", "21"],
        &["E2", "S2", "EUR", "50.00", "60.50", "21"],
        &["E3", "S3", "EUR", "200.00", "242.00", "21"],
    ]);
    let candidates = vec![
        candidate(3, "Amount", false, false, false),
        candidate(4, "Total", false, false, false),
        candidate(5, "VAT Rate", false, false, true),
    ];
    let resolved = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10).unwrap();
    assert_eq!(resolved.price_column, 3);
    assert_eq!(resolved.vat_column, Some(5));
}

#[test]
fn test_ratio_rule_respects_tolerance() {
    // Gross is 5% off the VAT arithmetic, outside the default 1% tolerance
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Amount", "Total", "VAT Rate"],
        &["E1", "S1", "EUR", "100.00", "127.00", "21"],
        &["E2", "S2", "EUR", "50.00", "63.50", "21"],
    ]);
    let candidates = vec![
        candidate(3, "Amount", false, false, false),
        candidate(4, "Total", false, false, false),
        candidate(5, "VAT Rate", false, false, true),
    ];
    let result = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10);
    assert!(matches!(result, Err(Error::AmbiguousPrice { .. })));

    // A loose tolerance accepts the same pair
    let loose = PriceConfig {
        vat_ratio_tolerance: 0.1,
        ..PriceConfig::default()
    };
    let resolved = resolve(&grid, 0, &candidates, &loose, 10).unwrap();
    assert_eq!(resolved.price_column, 3);
}

#[test]
fn test_equally_named_candidates_are_ambiguous() {
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Amount", "Amount"],
        &["E1", "S1", "EUR", "50.00", "50.00"],
        &["E2", "S2", "EUR", "60.00", "60.00"],
    ]);
    let candidates = vec![
        candidate(3, "Amount", false, false, false),
        candidate(4, "Amount", false, false, false),
    ];
    let result = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10);
    match result {
        Err(Error::AmbiguousPrice { candidates }) => {
            assert_eq!(candidates, vec!["Amount".to_string(), "Amount".to_string()]);
        }
        other => panic!("expected AmbiguousPrice, got {:?}", other),
    }
}

#[test]
fn test_no_candidates_is_ambiguous() {
    let grid = text_grid(&[&["EVSE", "Session", "Currency"], &["E1", "S1", "EUR"]]);
    let result = resolve(&grid, 0, &[], &PriceConfig::default(), 10);
    assert!(matches!(
        result,
        Err(Error::AmbiguousPrice { candidates }) if candidates.is_empty()
    ));
}

#[test]
fn test_ratio_rule_needs_enough_rows() {
    // A single comparable row is below min_ratio_rows; the resolver must
    // refuse rather than trust one coincidence
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Amount", "Total", "VAT Rate"],
        &["E1", "S1", "EUR", "100.00", "121.00", "21"],
    ]);
    let candidates = vec![
        candidate(3, "Amount", false, false, false),
        candidate(4, "Total", false, false, false),
        candidate(5, "VAT Rate", false, false, true),
    ];
    let result = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10);
    assert!(matches!(result, Err(Error::AmbiguousPrice { .. })));
}

#[test]
fn test_sole_gross_candidate_never_promoted_to_net() {
    // Net column missing entirely: a gross-named column plus a VAT column
    // must not be silently emitted as the net price
    let grid = text_grid(&[
        &["EVSE", "Session", "Currency", "Price Gross", "VAT Rate"],
        &["E1", "S1", "EUR", "121.00", "21"],
    ]);
    let candidates = vec![
        candidate(3, "Price Gross", false, true, false),
        candidate(4, "VAT Rate", false, false, true),
    ];
    let result = resolve(&grid, 0, &candidates, &PriceConfig::default(), 10);
    assert!(matches!(result, Err(Error::AmbiguousPrice { .. })));
}
