//! Schema validator: column-presence check over the canonical record set.

use anyhow::{bail, Result};

use crate::table::Table;

use super::REQUIRED_COLUMNS;

/// Check that every required canonical column exists.
///
/// Only column presence is inspected, never cell values; a column made
/// entirely of missing values still passes. On failure the error names
/// every missing column in one message.
pub fn validate_schema(table: &Table) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !table.has_column(col))
        .copied()
        .collect();

    if !missing.is_empty() {
        bail!("Missing required columns: {}", missing.join(", "));
    }
    Ok(())
}
