//! Per-file projection statistics
//!
//! Tracks how many data rows a file carried and how many were dropped
//! during projection, for the per-file tallies in the merge report.

/// Row accounting for one projected file
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionStats {
    /// Data rows inspected (rows after the header row)
    pub data_rows: usize,

    /// Rows dropped because a mandatory field was empty or unparseable
    pub rows_skipped: usize,
}

impl ProjectionStats {
    pub fn new() -> Self {
        Self {
            data_rows: 0,
            rows_skipped: 0,
        }
    }

    /// Rows that made it into the canonical table
    pub fn rows_emitted(&self) -> usize {
        self.data_rows - self.rows_skipped
    }

    /// Fraction of data rows that projected successfully
    pub fn success_rate(&self) -> f64 {
        if self.data_rows == 0 {
            0.0
        } else {
            self.rows_emitted() as f64 / self.data_rows as f64 * 100.0
        }
    }
}

impl Default for ProjectionStats {
    fn default() -> Self {
        Self::new()
    }
}
