//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::app::services::grid_decoder;
use crate::config::Config;
use crate::{Error, Result};

/// Batch statistics for reporting
#[derive(Debug, Clone, Default)]
pub struct ReconciliationStats {
    /// Number of files submitted
    pub files_submitted: usize,
    /// Number of files that contributed rows
    pub files_merged: usize,
    /// Number of files that failed (decode or normalization)
    pub files_failed: usize,
    /// Canonical rows written
    pub rows_emitted: usize,
    /// Data rows skipped across successful files
    pub rows_skipped: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
}

impl ReconciliationStats {
    /// Fraction of submitted files that merged successfully
    pub fn success_rate(&self) -> f64 {
        if self.files_submitted == 0 {
            0.0
        } else {
            self.files_merged as f64 / self.files_submitted as f64 * 100.0
        }
    }
}

/// Set up structured logging to stderr
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("invoice_reconciler={}", log_level)));

    if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration (file -> CLI overrides) for the merge command
pub fn load_configuration(
    config_file: Option<&Path>,
    workers: Option<usize>,
    vat_tolerance: Option<f64>,
    sample_size: Option<usize>,
) -> Result<Config> {
    let mut config = match config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            Config::from_toml_file(path)?
        }
        None => Config::default(),
    };

    if let Some(workers) = workers {
        config.performance.parallel_workers = workers;
    }
    if let Some(tolerance) = vat_tolerance {
        config.price.vat_ratio_tolerance = tolerance;
    }
    if let Some(sample_size) = sample_size {
        config.classifier.sample_size = sample_size;
    }

    config.validate()?;
    Ok(config)
}

/// Expand the input arguments into an ordered list of invoice files
///
/// Explicit files keep their argument order; directories are scanned
/// recursively for supported extensions and contribute their files in
/// sorted order.
pub fn discover_input_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .map(|entry| entry.path().to_path_buf())
                .filter(|path| grid_decoder::is_supported(path))
                .collect();
            found.sort();
            debug!(
                "Discovered {} invoice files in {}",
                found.len(),
                input.display()
            );
            files.extend(found);
        } else {
            return Err(Error::configuration(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        }
    }

    Ok(files)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
