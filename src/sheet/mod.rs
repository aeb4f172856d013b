//! Spreadsheet I/O boundary: reading raw tables from xlsx/csv and
//! writing enriched output workbooks.

pub mod reader;
pub mod writer;

pub use reader::read_table;
pub use writer::{write_csv, write_workbook};

/// Worksheet names in the output workbook.
pub const HOLDINGS_SHEET: &str = "Holdings";
pub const SUMMARY_SHEET: &str = "Summary";
