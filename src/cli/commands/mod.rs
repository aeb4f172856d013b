//! CLI command implementations.

pub mod coins;
pub mod track;
pub mod version;
