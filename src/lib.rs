pub mod cli;
pub mod data_paths;
pub mod display;
pub mod logging;
pub mod pricing;
pub mod schema;
pub mod sheet;
pub mod storage;
pub mod summary;
pub mod table;
