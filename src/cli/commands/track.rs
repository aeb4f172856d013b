//! Track command: the full ingest → normalize → validate → enrich →
//! summarize → write pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::info;

use crate::data_paths::DataPaths;
use crate::display;
use crate::pricing::{self, CoinGeckoClient, EnrichOptions, PriceCache};
use crate::schema;
use crate::sheet;
use crate::storage;
use crate::summary;

#[derive(Args, Clone)]
pub struct TrackArgs {
    /// Path to the input spreadsheet (.xlsx or .csv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the output workbook (default: <data-dir>/out/Updated_<input name>.xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the enriched records as CSV alongside the workbook
    #[arg(long)]
    pub csv: bool,

    /// Skip all price lookups; only cost basis is computed
    #[arg(long)]
    pub offline: bool,

    /// Delay between price lookups in milliseconds
    #[arg(long, default_value = "1000")]
    pub delay_ms: u64,

    /// Also load the canonical records into this SQLite database
    #[arg(long)]
    pub database: Option<PathBuf>,
}

pub struct TrackCommand {
    args: TrackArgs,
}

impl TrackCommand {
    pub fn new(args: TrackArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let raw = sheet::read_table(&self.args.input)?;
        let records = schema::normalize_headers(&raw);
        schema::validate_schema(&records)?;

        let client = CoinGeckoClient::new()?;
        let mut cache = PriceCache::new();
        let opts = EnrichOptions {
            offline: self.args.offline,
            delay_ms: self.args.delay_ms,
        };
        if self.args.offline {
            info!("offline mode: skipping all price lookups");
        }
        let enriched = pricing::enrich(&records, &client, &mut cache, &opts).await?;
        let summary = summary::summarize(&enriched);

        let out_xlsx = self.output_path(&data_paths);
        sheet::write_workbook(&out_xlsx, &enriched, &summary)?;
        display::print_wrote("workbook", &out_xlsx.display().to_string());

        if self.args.csv {
            let out_csv = out_xlsx.with_extension("csv");
            sheet::write_csv(&out_csv, &enriched)?;
            display::print_wrote("csv", &out_csv.display().to_string());
        }

        if let Some(db_path) = &self.args.database {
            let rows = storage::load_holdings(db_path, &records)?;
            display::print_wrote(
                "database",
                &format!("{} ({} rows)", db_path.display(), rows),
            );
        }

        display::print_summary(&summary);
        println!(
            "{} {} records processed",
            "Done.".bright_green().bold(),
            enriched.row_count()
        );
        Ok(())
    }

    fn output_path(&self, data_paths: &DataPaths) -> PathBuf {
        match &self.args.output {
            Some(path) => path.clone(),
            None => {
                let name = self
                    .args
                    .input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("holdings");
                data_paths.out().join(format!("Updated_{}.xlsx", name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str, output: Option<&str>) -> TrackArgs {
        TrackArgs {
            input: PathBuf::from(input),
            output: output.map(PathBuf::from),
            csv: false,
            offline: true,
            delay_ms: 0,
            database: None,
        }
    }

    #[test]
    fn test_default_output_named_after_input() {
        let cmd = TrackCommand::new(args("sheets/My Holdings.xlsx", None));
        let paths = DataPaths::new("/tmp/data");
        assert_eq!(
            cmd.output_path(&paths),
            PathBuf::from("/tmp/data/out/Updated_My Holdings.xlsx")
        );
    }

    #[test]
    fn test_explicit_output_wins() {
        let cmd = TrackCommand::new(args("in.xlsx", Some("custom/out.xlsx")));
        let paths = DataPaths::new("/tmp/data");
        assert_eq!(cmd.output_path(&paths), PathBuf::from("custom/out.xlsx"));
    }
}
