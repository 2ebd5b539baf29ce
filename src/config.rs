//! Configuration management and validation.
//!
//! Provides configuration structures for the reconciliation heuristics:
//! header detection thresholds, alias vocabularies, price resolution
//! tolerances and batch performance settings. Everything here is data, so
//! new vendor naming conventions are added without touching logic.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    aliases, DEFAULT_HEADER_SCAN_WINDOW, DEFAULT_MIN_ALIAS_SCORE,
    DEFAULT_MIN_NON_EMPTY_FRACTION, DEFAULT_MIN_NUMERIC_FRACTION, DEFAULT_MIN_RATIO_ROWS,
    DEFAULT_MIN_TEXTUAL_FRACTION, DEFAULT_SAMPLE_SIZE, DEFAULT_VAT_RATE_MAX,
    DEFAULT_VAT_RATE_MIN, DEFAULT_VAT_RATIO_TOLERANCE, MAX_DEFAULT_PARALLEL_WORKERS,
};
use crate::{Error, Result};

/// Header detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Number of leading rows scanned for a header
    pub scan_window: usize,

    /// Minimum fraction of non-empty cells for an eligible row
    pub min_non_empty_fraction: f64,

    /// Minimum fraction of non-numeric cells (among non-empty) for an
    /// eligible row
    pub min_textual_fraction: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            scan_window: DEFAULT_HEADER_SCAN_WINDOW,
            min_non_empty_fraction: DEFAULT_MIN_NON_EMPTY_FRACTION,
            min_textual_fraction: DEFAULT_MIN_TEXTUAL_FRACTION,
        }
    }
}

/// Alias vocabularies mapping header names to canonical roles
///
/// Entries are normalized the same way header labels are (lowercase,
/// punctuation collapsed to spaces) before matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasTables {
    pub equipment_id: Vec<String>,
    pub session_id: Vec<String>,
    pub currency: Vec<String>,
    pub monetary: Vec<String>,
    pub net_price: Vec<String>,
    pub gross_price: Vec<String>,
    pub vat_rate: Vec<String>,
}

fn to_strings(seed: &[&str]) -> Vec<String> {
    seed.iter().map(|s| s.to_string()).collect()
}

impl Default for AliasTables {
    fn default() -> Self {
        Self {
            equipment_id: to_strings(aliases::EQUIPMENT_ID),
            session_id: to_strings(aliases::SESSION_ID),
            currency: to_strings(aliases::CURRENCY),
            monetary: to_strings(aliases::MONETARY),
            net_price: to_strings(aliases::NET_PRICE),
            gross_price: to_strings(aliases::GROSS_PRICE),
            vat_rate: to_strings(aliases::VAT_RATE),
        }
    }
}

impl AliasTables {
    /// Every alias across all role tables
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.equipment_id
            .iter()
            .chain(self.session_id.iter())
            .chain(self.currency.iter())
            .chain(self.monetary.iter())
            .chain(self.net_price.iter())
            .chain(self.gross_price.iter())
            .chain(self.vat_rate.iter())
            .map(|s| s.as_str())
    }
}

/// Column classification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of data rows sampled for content-based checks
    pub sample_size: usize,

    /// Minimum name-similarity score for a role assignment
    pub min_alias_score: f64,

    /// Minimum fraction of numeric sampled values for a price candidate
    pub min_numeric_fraction: f64,

    /// Alias vocabularies, extendable per vendor
    pub aliases: AliasTables,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_alias_score: DEFAULT_MIN_ALIAS_SCORE,
            min_numeric_fraction: DEFAULT_MIN_NUMERIC_FRACTION,
            aliases: AliasTables::default(),
        }
    }
}

/// Price resolution parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Relative tolerance when testing `gross = net * (1 + vat/100)`
    pub vat_ratio_tolerance: f64,

    /// Plausible VAT-rate percentage range
    pub vat_rate_min: f64,
    pub vat_rate_max: f64,

    /// Minimum comparable rows for the ratio rule to apply
    pub min_ratio_rows: usize,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            vat_ratio_tolerance: DEFAULT_VAT_RATIO_TOLERANCE,
            vat_rate_min: DEFAULT_VAT_RATE_MIN,
            vat_rate_max: DEFAULT_VAT_RATE_MAX,
            min_ratio_rows: DEFAULT_MIN_RATIO_ROWS,
        }
    }
}

/// Batch performance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of files normalized concurrently
    pub parallel_workers: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel_workers: num_cpus::get().clamp(1, MAX_DEFAULT_PARALLEL_WORKERS),
        }
    }
}

/// Global configuration for invoice reconciliation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub header: HeaderConfig,
    pub classifier: ClassifierConfig,
    pub price: PriceConfig,
    pub performance: PerformanceConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "invalid config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate parameter ranges for consistency
    pub fn validate(&self) -> Result<()> {
        if self.header.scan_window == 0 {
            return Err(Error::configuration(
                "header.scan_window must be greater than 0",
            ));
        }
        for (name, value) in [
            (
                "header.min_non_empty_fraction",
                self.header.min_non_empty_fraction,
            ),
            (
                "header.min_textual_fraction",
                self.header.min_textual_fraction,
            ),
            ("classifier.min_alias_score", self.classifier.min_alias_score),
            (
                "classifier.min_numeric_fraction",
                self.classifier.min_numeric_fraction,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::configuration(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        if self.classifier.sample_size == 0 {
            return Err(Error::configuration(
                "classifier.sample_size must be greater than 0",
            ));
        }
        if self.price.vat_ratio_tolerance <= 0.0 {
            return Err(Error::configuration(
                "price.vat_ratio_tolerance must be positive",
            ));
        }
        if self.price.vat_rate_min >= self.price.vat_rate_max {
            return Err(Error::configuration(
                "price.vat_rate_min must be less than price.vat_rate_max",
            ));
        }
        if self.price.min_ratio_rows == 0 {
            return Err(Error::configuration(
                "price.min_ratio_rows must be greater than 0",
            ));
        }
        if self.performance.parallel_workers == 0 {
            return Err(Error::configuration(
                "performance.parallel_workers must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Create configuration with a custom sample size
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.classifier.sample_size = sample_size;
        self
    }

    /// Create configuration with a custom VAT ratio tolerance
    pub fn with_vat_ratio_tolerance(mut self, tolerance: f64) -> Self {
        self.price.vat_ratio_tolerance = tolerance;
        self
    }

    /// Create configuration with a custom worker count
    pub fn with_parallel_workers(mut self, workers: usize) -> Self {
        self.performance.parallel_workers = workers;
        self
    }
}

/// Upper sanity bound on worker counts accepted from the CLI
pub const MAX_PARALLEL_WORKERS: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = Config::default();
        config.header.min_textual_fraction = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.price.vat_ratio_tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.performance.parallel_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_sample_size(25)
            .with_vat_ratio_tolerance(0.05)
            .with_parallel_workers(2);
        assert_eq!(config.classifier.sample_size, 25);
        assert_eq!(config.price.vat_ratio_tolerance, 0.05);
        assert_eq!(config.performance.parallel_workers, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml_input = r#"
            [header]
            scan_window = 5

            [classifier]
            sample_size = 15

            [classifier.aliases]
            currency = ["currency", "waehrung"]

            [price]
            vat_ratio_tolerance = 0.02
        "#;
        let config: Config = toml::from_str(toml_input).unwrap();
        assert_eq!(config.header.scan_window, 5);
        assert_eq!(config.classifier.sample_size, 15);
        assert_eq!(config.price.vat_ratio_tolerance, 0.02);
        assert_eq!(
            config.classifier.aliases.currency,
            vec!["currency".to_string(), "waehrung".to_string()]
        );
        // Untouched sections keep their defaults
        assert_eq!(
            config.classifier.aliases.session_id,
            AliasTables::default().session_id
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_alias_tables_all() {
        let tables = AliasTables::default();
        let all: Vec<&str> = tables.all().collect();
        assert!(all.contains(&"evse id"));
        assert!(all.contains(&"vat rate"));
        assert!(all.contains(&"currency"));
    }
}
