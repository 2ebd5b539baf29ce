//! Application constants for the invoice reconciler
//!
//! This module contains the default heuristic thresholds, the seed alias
//! vocabularies and the currency tables used throughout the application.
//! The alias tables are copied into [`crate::config::AliasTables`] at
//! configuration time so that vendor-specific vocabulary can be extended
//! without touching logic.

// =============================================================================
// Supported Input Formats
// =============================================================================

/// File extensions accepted by the grid decoder (lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xlsm", "xls", "ods"];

// =============================================================================
// Header Detection Defaults
// =============================================================================

/// Number of leading rows scanned for a header row
pub const DEFAULT_HEADER_SCAN_WINDOW: usize = 20;

/// Minimum fraction of non-empty cells for a row to qualify as a header
pub const DEFAULT_MIN_NON_EMPTY_FRACTION: f64 = 0.5;

/// Minimum fraction of non-numeric cells (among non-empty) for a header row
pub const DEFAULT_MIN_TEXTUAL_FRACTION: f64 = 0.5;

// =============================================================================
// Column Classification Defaults
// =============================================================================

/// Number of data rows sampled for content-based checks
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Minimum name-similarity score for a column to be assigned a role
pub const DEFAULT_MIN_ALIAS_SCORE: f64 = 0.55;

/// Minimum fraction of numeric values for a column to count as numeric
pub const DEFAULT_MIN_NUMERIC_FRACTION: f64 = 0.5;

// =============================================================================
// Price Resolution Defaults
// =============================================================================

/// Relative tolerance when testing `gross = net * (1 + vat/100)` row-wise
pub const DEFAULT_VAT_RATIO_TOLERANCE: f64 = 0.01;

/// Lower bound of plausible VAT-rate percentages
pub const DEFAULT_VAT_RATE_MIN: f64 = 0.0;

/// Upper bound of plausible VAT-rate percentages
pub const DEFAULT_VAT_RATE_MAX: f64 = 100.0;

/// Minimum number of comparable rows for the net/gross ratio rule to apply
pub const DEFAULT_MIN_RATIO_ROWS: usize = 2;

// =============================================================================
// Performance Defaults
// =============================================================================

/// Upper bound for the auto-detected parallel worker count
pub const MAX_DEFAULT_PARALLEL_WORKERS: usize = 8;

// =============================================================================
// Output Format
// =============================================================================

/// Column order of the canonical output table
pub const CANONICAL_HEADER: &[&str] = &["equipment_id", "session_id", "currency", "price"];

// =============================================================================
// Seed Alias Vocabularies
// =============================================================================

/// Seed vocabulary mapping header names to canonical roles.
///
/// All entries are pre-normalized: lowercase, punctuation replaced by single
/// spaces. They are matched against normalized header labels, so "EVSE_ID",
/// "Evse Id" and "evse-id" all hit the "evse id" entry.
pub mod aliases {
    /// Charging-equipment identifier columns
    pub const EQUIPMENT_ID: &[&str] = &[
        "evse id",
        "evse",
        "charge point id",
        "chargepoint",
        "charging station id",
        "station id",
        "charger id",
        "cp id",
    ];

    /// Charging-session identifier columns
    pub const SESSION_ID: &[&str] = &[
        "session id",
        "transaction id",
        "charge session id",
        "charging session",
        "session number",
        "session",
        "transaction",
    ];

    /// Currency columns
    pub const CURRENCY: &[&str] = &["currency", "curr", "ccy"];

    /// Generic monetary vocabulary marking a column as a price candidate
    pub const MONETARY: &[&str] = &[
        "price", "amount", "total", "sum", "cost", "fee", "value", "net", "gross", "netto",
        "brutto",
    ];

    /// Vocabulary identifying a column as a net (pre-VAT) price
    pub const NET_PRICE: &[&str] = &[
        "net",
        "net price",
        "price net",
        "net amount",
        "amount net",
        "ex vat",
        "excl vat",
        "netto",
    ];

    /// Vocabulary identifying a column as a gross (VAT-inclusive) price
    pub const GROSS_PRICE: &[&str] = &[
        "gross",
        "gross price",
        "price gross",
        "gross amount",
        "incl vat",
        "brutto",
    ];

    /// Vocabulary identifying a column as a VAT-rate percentage
    pub const VAT_RATE: &[&str] = &["vat", "vat rate", "vat percent", "tax rate", "mwst", "tax"];
}

/// Generic invoice vocabulary used by the header keyword heuristic, in
/// addition to the role aliases above
pub const HEADER_KEYWORDS: &[&str] = &[
    "name", "company", "currency", "price", "amount", "total", "invoice", "date", "sum", "vendor",
    "id", "kwh", "energy", "start", "end", "duration",
];

// =============================================================================
// Currency Tables
// =============================================================================

/// ISO-4217 codes recognized during content-based currency detection
pub const CURRENCY_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "INR", "SEK", "NOK", "DKK", "PLN",
    "CZK", "HUF", "RON", "BGN", "RUB", "KRW",
];

/// Currency symbols recognized in cell content, with the code each maps to
/// during projection
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("€", "EUR"),
    ("£", "GBP"),
    ("$", "USD"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₽", "RUB"),
    ("₩", "KRW"),
];
