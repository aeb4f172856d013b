//! Persistence sinks beyond the spreadsheet outputs.

pub mod sqlite;

pub use sqlite::load_holdings;
