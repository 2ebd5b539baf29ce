//! Invoice Reconciler Library
//!
//! A Rust library for reconciling tabular EV-charging invoice exports from
//! different billing systems into one canonical session table.
//!
//! This library provides tools for:
//! - Decoding CSV/XLSX/XLS exports into untyped cell grids
//! - Locating the true header row inside otherwise arbitrary sheets
//! - Classifying raw columns into canonical fields via name and content heuristics
//! - Disambiguating net prices from gross prices and VAT-rate columns
//! - Merging per-file results while containing per-file failures
//! - Writing the canonical table as CSV

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod grid_decoder;
        pub mod merger;
        pub mod normalizer;
        pub mod table_writer;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    CanonicalRow, ColumnMapping, ColumnRole, FailureReport, FailureStage, Grid, MergedOutput,
    NormalizationResult, RawCell,
};
pub use config::Config;

/// Result type alias for the invoice reconciler
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for reconciliation operations
///
/// The three heuristic variants (`NoHeaderFound`, `MissingMandatoryField`,
/// `AmbiguousPrice`) are per-file: the normalizer converts them into
/// [`FailureReport`]s instead of letting them cross file boundaries.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File extension not handled by the grid decoder
    #[error("unsupported file format '{extension}' for '{file}'")]
    UnsupportedFormat { file: String, extension: String },

    /// Workbook or byte-stream decoding failed
    #[error("failed to decode '{file}': {message}")]
    Decode { file: String, message: String },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// No row in the scanned window qualified as a header row
    #[error("no header row found within the first {scanned} scanned rows")]
    NoHeaderFound { scanned: usize },

    /// A mandatory canonical column could not be identified
    #[error("mandatory column '{role}' could not be identified")]
    MissingMandatoryField { role: app::models::ColumnRole },

    /// Several price candidates remained indistinguishable, or none were found
    #[error("{}", ambiguous_price_message(.candidates))]
    AmbiguousPrice { candidates: Vec<String> },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Writing the canonical table failed
    #[error("Output writing error: {message}")]
    OutputWriting {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

fn ambiguous_price_message(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "no candidate price columns were found".to_string()
    } else {
        format!(
            "cannot distinguish the net price among columns: {}",
            candidates.join(", ")
        )
    }
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an unsupported-format error
    pub fn unsupported_format(file: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            file: file.into(),
            extension: extension.into(),
        }
    }

    /// Create a decode error
    pub fn decode(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a no-header-found error
    pub fn no_header_found(scanned: usize) -> Self {
        Self::NoHeaderFound { scanned }
    }

    /// Create a missing-mandatory-field error
    pub fn missing_mandatory_field(role: app::models::ColumnRole) -> Self {
        Self::MissingMandatoryField { role }
    }

    /// Create an ambiguous-price error naming the tied candidate headers
    pub fn ambiguous_price(candidates: Vec<String>) -> Self {
        Self::AmbiguousPrice { candidates }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output writing error
    pub fn output_writing(message: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::OutputWriting {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}
