//! Inspect command implementation
//!
//! Decodes a single file and prints the detected header row, the column
//! role mapping and the price resolution verdict without writing any
//! output. Runs the same service code paths as the merge command, so what
//! it shows is what a merge would use.

use colored::Colorize;
use tracing::info;

use super::shared::{load_configuration, setup_logging};
use crate::app::services::grid_decoder;
use crate::app::services::normalizer::{FileNormalizer, ResolvedPrice};
use crate::app::models::NormalizationResult;
use crate::cli::args::InspectArgs;
use crate::Result;

/// Inspect command runner; always exits 0 unless the file cannot be decoded
pub fn run_inspect(args: InspectArgs) -> Result<i32> {
    setup_logging(args.get_log_level(), false)?;
    args.validate()?;

    let config = load_configuration(args.config_file.as_deref(), None, None, args.sample_size)?;
    let grid = grid_decoder::decode_path(&args.file)?;
    info!(file = %grid.file_name, rows = grid.row_count(), "file decoded");

    println!(
        "{} {} ({}, {} rows x {} columns)",
        "Inspecting".bold(),
        grid.file_name,
        grid.format,
        grid.row_count(),
        grid.column_count()
    );

    let normalizer = FileNormalizer::new(&config);
    let (header, outcome, price_verdict) = match normalizer.analyze(&grid) {
        Ok(analysis) => analysis,
        Err(e) => {
            println!("  {} {}", "header:".red().bold(), e);
            return Ok(0);
        }
    };

    println!(
        "  {} row {} (score {:.2})",
        "header:".green().bold(),
        header.row,
        header.score
    );

    println!("  {}", "columns:".green().bold());
    let mut assignments: Vec<_> = outcome.mapping.iter().collect();
    assignments.sort_by_key(|&(_, col)| col);
    for (role, col) in assignments {
        let label = grid
            .cell(header.row, col)
            .and_then(|c| c.to_display_string())
            .unwrap_or_default();
        println!("    {:>3}  {:<14} {}", col, role.to_string(), label);
    }

    if !outcome.price_candidates.is_empty() {
        println!("  {}", "price candidates:".green().bold());
        for candidate in &outcome.price_candidates {
            let mut flags = Vec::new();
            if candidate.matches_net {
                flags.push("net");
            }
            if candidate.matches_gross {
                flags.push("gross");
            }
            if candidate.matches_vat {
                flags.push("vat");
            }
            println!(
                "    {:>3}  {:<20} [{}]",
                candidate.column,
                candidate.header,
                flags.join(", ")
            );
        }
    }

    match price_verdict {
        Ok(ResolvedPrice {
            price_column,
            vat_column,
        }) => {
            println!("  {} column {}", "net price:".green().bold(), price_column);
            if let Some(vat) = vat_column {
                println!("  {} column {}", "vat rate:".green().bold(), vat);
            }
        }
        Err(e) => println!("  {} {}", "price:".red().bold(), e),
    }

    // Full normalization for the row accounting
    match normalizer.normalize(&grid) {
        NormalizationResult::Normalized(file) => {
            println!(
                "  {} {} rows would merge, {} skipped",
                "projection:".green().bold(),
                file.rows.len(),
                file.skipped_rows
            );
        }
        NormalizationResult::Failed(report) => {
            println!(
                "  {} would fail at {}: {}",
                "projection:".red().bold(),
                report.stage,
                report.reason
            );
        }
    }

    Ok(0)
}
