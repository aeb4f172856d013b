//! Canonical working schema: header normalization and validation.
//!
//! Input spreadsheets arrive with arbitrary, inconsistently-cased,
//! alias-laden column names. [`normalize`] maps them deterministically
//! onto the canonical schema every downstream stage depends on by exact
//! name; [`validate`] then fails fast if any required column is missing.

pub mod normalize;
pub mod validate;

pub use normalize::{normalize_headers, normalize_label};
pub use validate::validate_schema;

/// Canonical column names. Downstream stages address columns by these
/// exact strings.
pub const COL_DATE: &str = "Date of Purchase";
pub const COL_COIN: &str = "Coin Type";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_COST_PER_COIN: &str = "Cost per Coin (USD)";
pub const COL_FEES: &str = "Fees (USD)";
pub const COL_EXCHANGE: &str = "Exchange";
pub const COL_TX_ID: &str = "Transaction ID";
pub const COL_NOTES: &str = "Notes";
pub const COL_TOTAL_COST: &str = "Total Cost (USD)";

/// Canonical column order for the working record set.
pub const CANONICAL_COLUMNS: &[&str] = &[
    COL_DATE,
    COL_COIN,
    COL_QUANTITY,
    COL_COST_PER_COIN,
    COL_FEES,
    COL_EXCHANGE,
    COL_TX_ID,
    COL_NOTES,
    COL_TOTAL_COST,
];

/// Columns that must exist after normalization for a run to proceed.
pub const REQUIRED_COLUMNS: &[&str] = &[COL_DATE, COL_COIN, COL_QUANTITY, COL_COST_PER_COIN];

/// Columns coerced to floating point during normalization.
pub const NUMERIC_COLUMNS: &[&str] = &[COL_QUANTITY, COL_COST_PER_COIN, COL_FEES, COL_TOTAL_COST];
