//! Merge command implementation
//!
//! This module contains the complete reconciliation workflow: configuration
//! loading, file decoding, batch normalization, output writing and report
//! generation.

use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::shared::{
    create_progress_bar, discover_input_files, load_configuration, setup_logging,
    ReconciliationStats,
};
use crate::app::models::{FailureReport, FailureStage, Grid, MergedOutput};
use crate::app::services::{grid_decoder, merger::Merger, table_writer};
use crate::cli::args::{MergeArgs, OutputFormat};
use crate::{Error, Result};

/// Merge command runner
///
/// Orchestrates the workflow:
/// 1. Set up logging and configuration
/// 2. Discover and decode the input files
/// 3. Normalize and merge per file, failures contained
/// 4. Write the canonical table and the reports
///
/// Returns the process exit code: 0 normally, 2 under `--strict` when any
/// file failed.
pub async fn run_merge(args: MergeArgs) -> Result<i32> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting invoice reconciliation");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(
        args.config_file.as_deref(),
        args.workers,
        args.vat_tolerance,
        args.sample_size,
    )?;

    let files = discover_input_files(&args.inputs)?;
    if files.is_empty() {
        return Err(Error::configuration(
            "no invoice files found in the given inputs".to_string(),
        ));
    }
    info!("Reconciling {} invoice files", files.len());

    // Decode phase. Files that cannot be decoded are contained as per-file
    // failures, exactly like normalization failures.
    let progress = if args.show_progress() {
        Some(create_progress_bar(
            files.len() as u64,
            "Decoding invoice files...",
        ))
    } else {
        None
    };

    let mut grids: Vec<Grid> = Vec::new();
    let mut decode_failures: Vec<FailureReport> = Vec::new();
    for path in &files {
        match grid_decoder::decode_path(path) {
            Ok(grid) => grids.push(grid),
            Err(e) => {
                error!("Failed to decode {}: {}", path.display(), e);
                decode_failures.push(FailureReport::new(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string()),
                    FailureStage::Header,
                    e.to_string(),
                ));
            }
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = &progress {
        pb.finish_with_message(format!(
            "Decoded {} of {} files",
            grids.len(),
            files.len()
        ));
    }

    // Normalize and merge, fanned out over the configured workers
    let merger = Merger::new(Arc::new(config.clone()));
    let mut output = merger
        .merge_parallel(grids, config.performance.parallel_workers)
        .await;
    // Decode failures join the report after the normalization failures
    output.failures.extend(decode_failures);

    table_writer::write_csv_file(&output, &args.output)?;

    if let Some(report_path) = &args.report {
        write_json_report(&output, report_path)?;
    }

    let stats = ReconciliationStats {
        files_submitted: files.len(),
        files_merged: output.summaries.len(),
        files_failed: output.failures.len(),
        rows_emitted: output.rows.len(),
        rows_skipped: output.summaries.iter().map(|s| s.rows_skipped).sum(),
        processing_time: start_time.elapsed(),
    };

    match args.output_format {
        OutputFormat::Human => print_human_report(&args, &stats, &output),
        OutputFormat::Json => print_json_report(&stats, &output)?,
    }

    if args.strict && !output.failures.is_empty() {
        Ok(2)
    } else {
        Ok(0)
    }
}

/// Write the failure report and per-file summaries as JSON
fn write_json_report(output: &MergedOutput, path: &Path) -> Result<()> {
    let report = serde_json::json!({
        "summaries": output.summaries,
        "failures": output.failures,
    });
    let content = serde_json::to_string_pretty(&report).map_err(|e| {
        Error::output_writing(format!("failed to serialize report: {}", e), None)
    })?;
    std::fs::write(path, content).map_err(|e| {
        Error::output_writing(format!("failed to write '{}'", path.display()), Some(e))
    })?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn print_human_report(args: &MergeArgs, stats: &ReconciliationStats, output: &MergedOutput) {
    if args.quiet {
        return;
    }

    println!();
    println!(
        "{} in {:.2}s",
        "Reconciliation complete".green().bold(),
        stats.processing_time.as_secs_f64()
    );
    println!(
        "  Files:  {} submitted, {} merged, {} failed",
        stats.files_submitted, stats.files_merged, stats.files_failed
    );
    println!(
        "  Rows:   {} merged, {} skipped",
        stats.rows_emitted, stats.rows_skipped
    );
    println!("  Output: {}", args.output.display());

    if !output.failures.is_empty() {
        println!();
        println!("{}", "Failures:".red().bold());
        for failure in &output.failures {
            println!(
                "  {} [{}]: {}",
                failure.file_name.yellow(),
                failure.stage,
                failure.reason
            );
        }
    }

    let skipped: Vec<_> = output
        .summaries
        .iter()
        .filter(|s| s.rows_skipped > 0)
        .collect();
    if !skipped.is_empty() {
        println!();
        println!("{}", "Skipped rows:".yellow().bold());
        for summary in skipped {
            println!(
                "  {}: {} of {} rows skipped",
                summary.file_name,
                summary.rows_skipped,
                summary.rows_emitted + summary.rows_skipped
            );
        }
    }
}

fn print_json_report(stats: &ReconciliationStats, output: &MergedOutput) -> Result<()> {
    let report = serde_json::json!({
        "files_submitted": stats.files_submitted,
        "files_merged": stats.files_merged,
        "files_failed": stats.files_failed,
        "rows_emitted": stats.rows_emitted,
        "rows_skipped": stats.rows_skipped,
        "processing_seconds": stats.processing_time.as_secs_f64(),
        "summaries": output.summaries,
        "failures": output.failures,
    });
    let rendered = serde_json::to_string_pretty(&report).map_err(|e| {
        Error::output_writing(format!("failed to serialize summary: {}", e), None)
    })?;
    println!("{}", rendered);
    Ok(())
}
