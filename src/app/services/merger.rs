//! Batch merging of normalized invoice files
//!
//! Each file is normalized independently; a failure in one file never
//! affects another. Successful rows concatenate in file-input order, and
//! every failed file contributes exactly one failure report.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::app::models::{
    FailureReport, FailureStage, FileSummary, Grid, MergedOutput, NormalizationResult,
};
use crate::app::services::normalizer::FileNormalizer;
use crate::config::Config;

/// Drives the file normalizer over a batch of decoded grids
pub struct Merger {
    config: Arc<Config>,
}

impl Merger {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Normalize every grid in order and assemble the merged output
    pub fn merge(&self, grids: &[Grid]) -> MergedOutput {
        let normalizer = FileNormalizer::new(&self.config);
        let results: Vec<NormalizationResult> =
            grids.iter().map(|grid| normalizer.normalize(grid)).collect();
        Self::assemble(results)
    }

    /// Same output as [`Merger::merge`], with per-file work fanned out on
    /// blocking tasks bounded by `workers`. Results are collected in input
    /// order, never completion order.
    pub async fn merge_parallel(&self, grids: Vec<Grid>, workers: usize) -> MergedOutput {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let tasks: Vec<_> = grids
            .into_iter()
            .map(|grid| {
                let config = Arc::clone(&self.config);
                let semaphore = Arc::clone(&semaphore);
                async move {
                    // The semaphore is never closed, so a failed acquire just
                    // means running unthrottled
                    let _permit = semaphore.acquire_owned().await.ok();
                    let file_name = grid.file_name.clone();
                    tokio::task::spawn_blocking(move || {
                        FileNormalizer::new(&config).normalize(&grid)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        NormalizationResult::Failed(FailureReport::new(
                            file_name,
                            FailureStage::Header,
                            format!("normalization task failed: {}", e),
                        ))
                    })
                }
            })
            .collect();

        let results = join_all(tasks).await;
        Self::assemble(results)
    }

    /// Concatenate successes in input order and collect failure reports
    fn assemble(results: Vec<NormalizationResult>) -> MergedOutput {
        let mut output = MergedOutput::default();
        for result in results {
            match result {
                NormalizationResult::Normalized(file) => {
                    output.summaries.push(FileSummary {
                        file_name: file.file_name,
                        rows_emitted: file.rows.len(),
                        rows_skipped: file.skipped_rows,
                    });
                    output.rows.extend(file.rows);
                }
                NormalizationResult::Failed(report) => {
                    warn!(
                        file = %report.file_name,
                        stage = %report.stage,
                        reason = %report.reason,
                        "file contributed no rows"
                    );
                    output.failures.push(report);
                }
            }
        }
        info!(
            rows = output.rows.len(),
            files = output.summaries.len(),
            failures = output.failures.len(),
            "merge complete"
        );
        output
    }
}
