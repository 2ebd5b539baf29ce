//! Command-line argument definitions for the invoice reconciler
//!
//! This module defines the complete CLI interface using the clap derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::MAX_PARALLEL_WORKERS;
use crate::{Error, Result};

/// CLI arguments for the invoice reconciler
///
/// Reconciles tabular EV-charging invoice exports (CSV, XLSX, XLS) with
/// unrelated column layouts into one canonical session table.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "invoice-reconciler",
    version,
    about = "Reconcile heterogeneous EV-charging invoice exports into one canonical table",
    long_about = "Ingests invoice exports produced by different billing systems, detects the \
                  header row and the equipment/session/currency/price columns in each file, \
                  resolves net prices against gross and VAT-rate columns, and merges \
                  everything into a single canonical CSV. Files that cannot be classified \
                  are reported, never silently guessed."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the invoice reconciler
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Merge invoice exports into one canonical table (main command)
    Merge(MergeArgs),
    /// Show the detected schema of a single file without writing output
    Inspect(InspectArgs),
}

/// Arguments for the merge command (main reconciliation)
#[derive(Debug, Clone, Parser)]
pub struct MergeArgs {
    /// Invoice files or directories to reconcile
    ///
    /// Directories are scanned for supported files (csv, xlsx, xlsm, xls,
    /// ods), sorted by name. Explicit files are taken as given, in order.
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output path for the canonical CSV table
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        default_value = "combined_invoices.csv"
    )]
    pub output: PathBuf,

    /// Write the failure report and per-file summaries as JSON
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Output format for the final summary
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the final summary"
    )]
    pub output_format: OutputFormat,

    /// Path to configuration file
    ///
    /// TOML file with heuristic thresholds and alias vocabularies. CLI flags
    /// override file values.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of files normalized concurrently
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Relative tolerance for the net/gross VAT-ratio check
    #[arg(long = "vat-tolerance", value_name = "RATIO")]
    pub vat_tolerance: Option<f64>,

    /// Number of data rows sampled for content heuristics
    #[arg(long = "sample-size", value_name = "ROWS")]
    pub sample_size: Option<usize>,

    /// Exit non-zero when any file failed to normalize
    #[arg(long = "strict")]
    pub strict: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the inspect command (per-file schema diagnostics)
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Invoice file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path to configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of data rows sampled for content heuristics
    #[arg(long = "sample-size", value_name = "ROWS")]
    pub sample_size: Option<usize>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for the final summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<Commands> {
        self.command.clone()
    }
}

impl MergeArgs {
    /// Validate the merge command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        for input in &self.inputs {
            if !input.exists() {
                return Err(Error::configuration(format!(
                    "Input path does not exist: {}",
                    input.display()
                )));
            }
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0".to_string(),
                ));
            }
            if workers > MAX_PARALLEL_WORKERS {
                return Err(Error::configuration(format!(
                    "Number of workers cannot exceed {}",
                    MAX_PARALLEL_WORKERS
                )));
            }
        }

        if let Some(tolerance) = self.vat_tolerance {
            if tolerance <= 0.0 || tolerance >= 1.0 {
                return Err(Error::configuration(
                    "VAT tolerance must be between 0 and 1 (exclusive)".to_string(),
                ));
            }
        }

        if let Some(sample_size) = self.sample_size {
            if sample_size == 0 {
                return Err(Error::configuration(
                    "Sample size must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl InspectArgs {
    /// Validate the inspect command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.file.exists() {
            return Err(Error::configuration(format!(
                "Input file does not exist: {}",
                self.file.display()
            )));
        }

        if let Some(sample_size) = self.sample_size {
            if sample_size == 0 {
                return Err(Error::configuration(
                    "Sample size must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn base_merge_args(input: PathBuf) -> MergeArgs {
        MergeArgs {
            inputs: vec![input],
            output: PathBuf::from("combined_invoices.csv"),
            report: None,
            output_format: OutputFormat::Human,
            config_file: None,
            workers: None,
            vat_tolerance: None,
            sample_size: None,
            strict: false,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn test_merge_args_validation() {
        let temp_dir = TempDir::new().unwrap();
        let args = base_merge_args(temp_dir.path().to_path_buf());
        assert!(args.validate().is_ok());

        // Nonexistent input path
        let mut invalid = args.clone();
        invalid.inputs = vec![PathBuf::from("/nonexistent/invoices")];
        assert!(invalid.validate().is_err());

        // Invalid worker counts
        let mut invalid = args.clone();
        invalid.workers = Some(0);
        assert!(invalid.validate().is_err());
        invalid.workers = Some(MAX_PARALLEL_WORKERS + 1);
        assert!(invalid.validate().is_err());

        // Invalid VAT tolerance
        let mut invalid = args.clone();
        invalid.vat_tolerance = Some(0.0);
        assert!(invalid.validate().is_err());
        invalid.vat_tolerance = Some(1.5);
        assert!(invalid.validate().is_err());

        // Invalid sample size
        let mut invalid = args.clone();
        invalid.sample_size = Some(0);
        assert!(invalid.validate().is_err());

        // Nonexistent config file
        let mut invalid = args;
        invalid.config_file = Some(PathBuf::from("/nonexistent/config.toml"));
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = base_merge_args(temp_dir.path().to_path_buf());

        assert_eq!(args.get_log_level(), "warn");
        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");
        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");
        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");
        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_show_progress() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = base_merge_args(temp_dir.path().to_path_buf());
        assert!(args.show_progress());
        args.quiet = true;
        assert!(!args.show_progress());
    }

    #[test]
    fn test_inspect_args_validation() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.csv");
        std::fs::write(&file, "x").unwrap();

        let args = InspectArgs {
            file,
            config_file: None,
            sample_size: None,
            verbose: 0,
        };
        assert!(args.validate().is_ok());

        let mut invalid = args;
        invalid.file = PathBuf::from("/nonexistent/a.csv");
        assert!(invalid.validate().is_err());
    }
}
