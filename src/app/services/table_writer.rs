//! Canonical table serialization
//!
//! Writes the merged output as CSV with the fixed four-column canonical
//! header, rows in merged order, prices rendered with their scale intact.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::app::models::MergedOutput;
use crate::constants::CANONICAL_HEADER;
use crate::{Error, Result};

/// Serialize the canonical table to any writer
pub fn write_csv<W: Write>(output: &MergedOutput, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(CANONICAL_HEADER)
        .map_err(|e| Error::output_writing(format!("failed to write header: {}", e), None))?;
    for row in &output.rows {
        let price = row.price.to_string();
        csv_writer
            .write_record([
                row.equipment_id.as_str(),
                row.session_id.as_str(),
                row.currency.as_str(),
                price.as_str(),
            ])
            .map_err(|e| Error::output_writing(format!("failed to write row: {}", e), None))?;
    }
    csv_writer
        .flush()
        .map_err(|e| Error::output_writing("failed to flush output".to_string(), Some(e)))?;
    Ok(())
}

/// Serialize the canonical table to a file
pub fn write_csv_file(output: &MergedOutput, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| {
        Error::output_writing(format!("failed to create '{}'", path.display()), Some(e))
    })?;
    write_csv(output, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), rows = output.rows.len(), "canonical table written");
    Ok(())
}
