//! File normalization pipeline for invoice grids
//!
//! This module turns one decoded grid into canonical rows, or into a
//! structured failure naming the stage that gave up. The stages run in a
//! fixed order and short-circuit on the first unmet requirement:
//!
//! ## Architecture
//!
//! - [`header_detector`] - locating the true header row
//! - [`column_classifier`] - mapping raw columns onto canonical roles
//! - [`price_resolver`] - picking the net price among monetary candidates
//! - [`projection`] - projecting data rows into the canonical schema
//! - [`stats`] - per-file row accounting
//!
//! ## Usage
//!
//! ```rust
//! use invoice_reconciler::app::services::normalizer::FileNormalizer;
//! use invoice_reconciler::app::models::Grid;
//! use invoice_reconciler::Config;
//!
//! # fn example(grid: Grid) {
//! let config = Config::default();
//! let result = FileNormalizer::new(&config).normalize(&grid);
//! # let _ = result;
//! # }
//! ```

pub mod column_classifier;
pub mod header_detector;
pub mod price_resolver;
pub mod projection;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use column_classifier::{ClassifierOutcome, ColumnClassifier, PriceCandidate};
pub use header_detector::HeaderCandidate;
pub use price_resolver::ResolvedPrice;
pub use stats::ProjectionStats;

use tracing::{debug, info};

use crate::app::models::{
    ColumnRole, FailureReport, FailureStage, Grid, NormalizationResult, NormalizedFile,
};
use crate::config::Config;
use projection::ProjectionPlan;

/// Normalizes one decoded grid into canonical rows or a structured failure
///
/// Stateless apart from configuration: normalizing the same grid twice
/// yields identical results.
#[derive(Debug)]
pub struct FileNormalizer<'a> {
    config: &'a Config,
}

impl<'a> FileNormalizer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Run header detection, classification, price resolution and projection
    /// for one file. Heuristic failures become a [`FailureReport`]; nothing
    /// escapes the file boundary.
    pub fn normalize(&self, grid: &Grid) -> NormalizationResult {
        // Header stage
        let header = match header_detector::detect(
            grid,
            &self.config.header,
            &self.config.classifier.aliases,
        ) {
            Ok(candidate) => candidate,
            Err(e) => return self.fail(grid, FailureStage::Header, e.to_string()),
        };
        debug!(file = %grid.file_name, row = header.row, "header row selected");

        // Classification stage
        let classifier = ColumnClassifier::new(&self.config.classifier);
        let outcome = classifier.classify(grid, header.row);
        for &role in ColumnRole::MANDATORY {
            if !outcome.mapping.contains(role) {
                return self.fail(
                    grid,
                    FailureStage::Classification,
                    crate::Error::missing_mandatory_field(role).to_string(),
                );
            }
        }

        // Price stage
        let resolved = match price_resolver::resolve(
            grid,
            header.row,
            &outcome.price_candidates,
            &self.config.price,
            self.config.classifier.sample_size,
        ) {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(grid, FailureStage::Price, e.to_string()),
        };

        let mut mapping = outcome.mapping;
        mapping.assign(ColumnRole::Price, resolved.price_column);
        if let Some(vat_column) = resolved.vat_column {
            mapping.assign(ColumnRole::VatRate, vat_column);
        }

        // The mandatory roles were checked above and Price was just assigned,
        // so the plan is complete by construction
        let plan = ProjectionPlan {
            equipment: mapping.get(ColumnRole::EquipmentId).unwrap_or_default(),
            session: mapping.get(ColumnRole::SessionId).unwrap_or_default(),
            currency: mapping.get(ColumnRole::Currency).unwrap_or_default(),
            price: resolved.price_column,
        };
        let (rows, stats) = projection::project(grid, header.row, &plan);
        info!(
            file = %grid.file_name,
            rows = rows.len(),
            skipped = stats.rows_skipped,
            "file normalized"
        );

        NormalizationResult::Normalized(NormalizedFile {
            file_name: grid.file_name.clone(),
            rows,
            data_rows: stats.data_rows,
            skipped_rows: stats.rows_skipped,
        })
    }

    fn fail(&self, grid: &Grid, stage: FailureStage, reason: String) -> NormalizationResult {
        debug!(file = %grid.file_name, stage = %stage, reason = %reason, "normalization failed");
        NormalizationResult::Failed(FailureReport::new(grid.file_name.clone(), stage, reason))
    }

    /// Expose the finalized mapping stages for diagnostic commands; returns
    /// the header row, the classifier outcome and the price verdict
    pub fn analyze(
        &self,
        grid: &Grid,
    ) -> crate::Result<(HeaderCandidate, ClassifierOutcome, crate::Result<ResolvedPrice>)> {
        let header = header_detector::detect(
            grid,
            &self.config.header,
            &self.config.classifier.aliases,
        )?;
        let classifier = ColumnClassifier::new(&self.config.classifier);
        let outcome = classifier.classify(grid, header.row);
        let resolved = price_resolver::resolve(
            grid,
            header.row,
            &outcome.price_candidates,
            &self.config.price,
            self.config.classifier.sample_size,
        );
        Ok((header, outcome, resolved))
    }
}
