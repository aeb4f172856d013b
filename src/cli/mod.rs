//! Command-line interface for cointrack.
//!
//! Uses clap for argument parsing with a structured command pattern:
//! each subcommand is an `XxxArgs` + `XxxCommand` pair under
//! [`commands`].

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{init_logging, LoggingConfig};

use commands::coins::{CoinsArgs, CoinsCommand};
use commands::track::{TrackArgs, TrackCommand};
use commands::version::{VersionArgs, VersionCommand};

#[derive(Parser)]
#[command(name = "cointrack")]
#[command(version)]
#[command(about = "Track crypto holdings from a spreadsheet with live prices and P/L", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a holdings spreadsheet, enrich it with prices and P/L, and
    /// write the updated outputs
    Track(TrackArgs),

    /// List the assets the price lookup recognizes
    Coins(CoinsArgs),

    /// Show version information
    Version(VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);
        data_paths.ensure_directories()?;
        init_logging(LoggingConfig::new(data_paths.clone(), self.verbose > 0))?;

        match self.command {
            Commands::Track(args) => TrackCommand::new(args).execute(data_paths).await,
            Commands::Coins(args) => CoinsCommand::new(args).execute(data_paths).await,
            Commands::Version(args) => VersionCommand::new(args).execute(data_paths).await,
        }
    }
}
