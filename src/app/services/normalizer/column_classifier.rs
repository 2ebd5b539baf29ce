//! Column role classification from header labels and sampled content
//!
//! Name matching runs first: each header label is scored against the alias
//! vocabulary of every text role. Content checks break ties between columns
//! that look alike by name, and act as a fallback when a mandatory role has
//! no name match at all. Price and VAT-rate columns are only collected as
//! candidates here; the final choice belongs to the price resolver.

use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::app::models::{parse_decimal_text, ColumnMapping, ColumnRole, Grid};
use crate::config::ClassifierConfig;
use crate::constants::{CURRENCY_CODES, CURRENCY_SYMBOLS};

/// A numeric column whose header suggests a monetary or rate quantity
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCandidate {
    pub column: usize,
    /// Raw header text, used in failure reports
    pub header: String,
    pub matches_net: bool,
    pub matches_gross: bool,
    pub matches_vat: bool,
}

/// Classification result: text-role mapping plus price candidates
#[derive(Debug, Clone)]
pub struct ClassifierOutcome {
    pub mapping: ColumnMapping,
    pub price_candidates: Vec<PriceCandidate>,
}

/// Normalize a header label for alias matching: lowercase, punctuation and
/// separators collapsed to single spaces
pub fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best similarity between a normalized label and a role's alias table
///
/// Exact equality scores 1.0. A label containing every token of an alias
/// ("net price" vs "net") scores 0.9; the reverse direction does not, so a
/// bare "Amount" never counts as a hit on "amount net". Everything else falls
/// back to token overlap.
pub fn alias_score(label: &str, aliases: &[String]) -> f64 {
    let label_tokens: HashSet<&str> = label.split(' ').filter(|t| !t.is_empty()).collect();
    if label_tokens.is_empty() {
        return 0.0;
    }
    let mut best = 0.0f64;
    for alias in aliases {
        if label == alias.as_str() {
            return 1.0;
        }
        let alias_tokens: HashSet<&str> = alias.split(' ').filter(|t| !t.is_empty()).collect();
        if alias_tokens.is_empty() {
            continue;
        }
        let score = if alias_tokens.iter().all(|t| label_tokens.contains(t)) {
            0.9
        } else {
            let intersection = label_tokens.intersection(&alias_tokens).count();
            let union = label_tokens.union(&alias_tokens).count();
            intersection as f64 / union as f64
        };
        if score > best {
            best = score;
        }
    }
    best
}

/// Assigns each raw column to at most one canonical text role and collects
/// the monetary candidate set for the price resolver
pub struct ColumnClassifier<'a> {
    config: &'a ClassifierConfig,
    identifier_shape: Regex,
    session_shape: Regex,
}

impl<'a> ColumnClassifier<'a> {
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self {
            config,
            identifier_shape: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("static pattern"),
            session_shape: Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("static pattern"),
        }
    }

    /// Classify every column of the grid given its header row.
    ///
    /// Never hard-fails: roles without a convincing column are simply absent
    /// from the returned mapping.
    pub fn classify(&self, grid: &Grid, header_row: usize) -> ClassifierOutcome {
        let width = grid.column_count();
        let headers: Vec<String> = (0..width)
            .map(|col| {
                grid.cell(header_row, col)
                    .and_then(|c| c.to_display_string())
                    .unwrap_or_default()
            })
            .collect();
        let labels: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();
        let samples: Vec<Vec<String>> = (0..width)
            .map(|col| sample_column(grid, header_row, col, self.config.sample_size))
            .collect();

        let mut mapping = ColumnMapping::new();

        // Name pass in the same order the original heuristics probe roles
        let role_tables = [
            (ColumnRole::EquipmentId, &self.config.aliases.equipment_id),
            (ColumnRole::SessionId, &self.config.aliases.session_id),
            (ColumnRole::Currency, &self.config.aliases.currency),
        ];
        for (role, aliases) in role_tables {
            if let Some(col) = self.best_name_match(role, aliases, &labels, &samples, &mapping) {
                mapping.assign(role, col);
            }
        }

        // Content fallback for mandatory roles the names did not reveal
        for &role in ColumnRole::MANDATORY {
            if !mapping.contains(role) {
                if let Some(col) = self.content_fallback(role, &samples, &mapping) {
                    debug!(role = %role, column = col, "role assigned by content fallback");
                    mapping.assign(role, col);
                }
            }
        }

        let price_candidates = self.price_candidates(&headers, &labels, &samples, &mapping);
        debug!(
            roles = mapping.len(),
            candidates = price_candidates.len(),
            "classification complete"
        );

        ClassifierOutcome {
            mapping,
            price_candidates,
        }
    }

    /// Best-scoring unassigned column for a role, content-tie-broken
    fn best_name_match(
        &self,
        role: ColumnRole,
        aliases: &[String],
        labels: &[String],
        samples: &[Vec<String>],
        mapping: &ColumnMapping,
    ) -> Option<usize> {
        let mut scored: Vec<(usize, f64)> = Vec::new();
        for (col, label) in labels.iter().enumerate() {
            if label.is_empty() || mapping.is_assigned_column(col) {
                continue;
            }
            let score = alias_score(label, aliases);
            if score >= self.config.min_alias_score {
                scored.push((col, score));
            }
        }
        let top = scored.iter().map(|&(_, s)| s).fold(f64::MIN, f64::max);
        let tied: Vec<usize> = scored
            .iter()
            .filter(|&&(_, s)| top - s < 1e-9)
            .map(|&(col, _)| col)
            .collect();
        match tied.len() {
            0 => None,
            1 => Some(tied[0]),
            _ => {
                debug!(role = %role, tied = tied.len(), "breaking role tie by content");
                Some(self.break_tie(role, &tied, samples))
            }
        }
    }

    /// Content tie-break: currency by value patterns, identifiers by
    /// row-to-row uniqueness. Earliest column wins residual ties.
    fn break_tie(&self, role: ColumnRole, tied: &[usize], samples: &[Vec<String>]) -> usize {
        let mut best = tied[0];
        let mut best_score = f64::MIN;
        for &col in tied {
            let score = match role {
                ColumnRole::Currency => currency_content_score(&samples[col]),
                _ => uniqueness_ratio(&samples[col]),
            };
            if score > best_score {
                best = col;
                best_score = score;
            }
        }
        best
    }

    fn content_fallback(
        &self,
        role: ColumnRole,
        samples: &[Vec<String>],
        mapping: &ColumnMapping,
    ) -> Option<usize> {
        match role {
            ColumnRole::Currency => self.currency_fallback(samples, mapping),
            ColumnRole::EquipmentId => self.identifier_fallback(samples, mapping, false),
            ColumnRole::SessionId => self.identifier_fallback(samples, mapping, true),
            _ => None,
        }
    }

    /// Currency by content: a non-numeric column dominated by known codes or
    /// symbols, with the short values typical of currency fields
    fn currency_fallback(&self, samples: &[Vec<String>], mapping: &ColumnMapping) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (col, sample) in samples.iter().enumerate() {
            if mapping.is_assigned_column(col) || sample.is_empty() {
                continue;
            }
            if numeric_fraction(sample) >= self.config.min_numeric_fraction {
                continue;
            }
            let score = currency_content_score(sample);
            if score >= 1.0 && best.map_or(true, |(_, b)| score > b) {
                best = Some((col, score));
            }
        }
        best.map(|(col, _)| col)
    }

    /// Identifier roles by content shape: alphanumeric values with
    /// separators, moderate consistent length; session ids prefer longer,
    /// hyphenated values
    fn identifier_fallback(
        &self,
        samples: &[Vec<String>],
        mapping: &ColumnMapping,
        session: bool,
    ) -> Option<usize> {
        let floor = if session { 3.0 } else { 2.0 };
        let mut best: Option<(usize, f64)> = None;
        for (col, sample) in samples.iter().enumerate() {
            if mapping.is_assigned_column(col) || sample.is_empty() {
                continue;
            }
            // Purely numeric columns are measurements, not identifiers
            if numeric_fraction(sample) >= 1.0 {
                continue;
            }
            let score = if session {
                self.session_content_score(sample)
            } else {
                self.equipment_content_score(sample)
            };
            if score > floor && best.map_or(true, |(_, b)| score > b) {
                best = Some((col, score));
            }
        }
        best.map(|(col, _)| col)
    }

    fn equipment_content_score(&self, sample: &[String]) -> f64 {
        let n = sample.len() as f64;
        let shaped = sample
            .iter()
            .filter(|v| self.identifier_shape.is_match(v))
            .count() as f64
            / n;
        let avg_len = average_length(sample);
        let mut score = 0.0;
        if shaped > 0.5 {
            score += 3.0;
        }
        if (4.0..=20.0).contains(&avg_len) {
            score += 2.0;
        }
        if length_std(sample) < 2.0 {
            score += 2.0;
        }
        score
    }

    fn session_content_score(&self, sample: &[String]) -> f64 {
        let n = sample.len() as f64;
        let hyphenated = sample.iter().filter(|v| v.contains('-')).count() as f64 / n;
        let consistent = sample
            .iter()
            .filter(|v| self.session_shape.is_match(&v.to_lowercase()))
            .count() as f64
            / n;
        let mut score = 0.0;
        if hyphenated > 0.5 {
            score += 3.0;
        }
        if average_length(sample) > 10.0 {
            score += 3.0;
        }
        if consistent > 0.7 {
            score += 2.0;
        }
        score
    }

    /// Numeric columns whose header matched monetary or VAT vocabulary.
    /// Final price assignment is delegated to the price resolver.
    fn price_candidates(
        &self,
        headers: &[String],
        labels: &[String],
        samples: &[Vec<String>],
        mapping: &ColumnMapping,
    ) -> Vec<PriceCandidate> {
        let threshold = self.config.min_alias_score;
        let aliases = &self.config.aliases;
        let mut candidates = Vec::new();
        for (col, label) in labels.iter().enumerate() {
            if label.is_empty() || mapping.is_assigned_column(col) {
                continue;
            }
            let matches_net = alias_score(label, &aliases.net_price) >= threshold;
            let matches_gross = alias_score(label, &aliases.gross_price) >= threshold;
            let matches_vat = alias_score(label, &aliases.vat_rate) >= threshold;
            let monetary = matches_net
                || matches_gross
                || matches_vat
                || alias_score(label, &aliases.monetary) >= threshold;
            if !monetary {
                continue;
            }
            // Name alone suffices for empty columns; sampled columns must
            // actually hold numbers
            let sample = &samples[col];
            if !sample.is_empty() && numeric_fraction(sample) < self.config.min_numeric_fraction {
                continue;
            }
            candidates.push(PriceCandidate {
                column: col,
                header: headers[col].clone(),
                matches_net,
                matches_gross,
                matches_vat,
            });
        }
        candidates
    }
}

/// First `limit` non-empty display values of a column below the header row
pub fn sample_column(grid: &Grid, header_row: usize, col: usize, limit: usize) -> Vec<String> {
    grid.data_rows(header_row)
        .iter()
        .filter_map(|row| row.get(col))
        .filter_map(|cell| cell.to_display_string())
        .take(limit)
        .collect()
}

fn numeric_fraction(sample: &[String]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let numeric = sample
        .iter()
        .filter(|v| parse_decimal_text(v).is_some())
        .count();
    numeric as f64 / sample.len() as f64
}

fn uniqueness_ratio(sample: &[String]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let distinct: HashSet<&str> = sample.iter().map(|s| s.as_str()).collect();
    distinct.len() as f64 / sample.len() as f64
}

fn currency_content_score(sample: &[String]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let code_matches = sample
        .iter()
        .filter(|v| {
            let upper = v.trim().to_uppercase();
            CURRENCY_CODES.contains(&upper.as_str())
        })
        .count();
    let symbol_matches = sample
        .iter()
        .filter(|v| CURRENCY_SYMBOLS.iter().any(|(symbol, _)| v.contains(symbol)))
        .count();
    let mut score = 2.0 * (code_matches + symbol_matches) as f64 / sample.len() as f64;
    let avg_len = average_length(sample);
    if (1.0..=4.0).contains(&avg_len) {
        score += 0.5;
    }
    score
}

fn average_length(sample: &[String]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().map(|v| v.chars().count()).sum::<usize>() as f64 / sample.len() as f64
}

fn length_std(sample: &[String]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    let mean = average_length(sample);
    let variance = sample
        .iter()
        .map(|v| {
            let diff = v.chars().count() as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / sample.len() as f64;
    variance.sqrt()
}
