//! Coins command: list the asset aliases the price lookup recognizes.

use anyhow::Result;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;

use crate::data_paths::DataPaths;
use crate::pricing::supported_coins;

#[derive(Args, Clone)]
pub struct CoinsArgs {}

pub struct CoinsCommand {
    _args: CoinsArgs,
}

impl CoinsCommand {
    pub fn new(args: CoinsArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(&self, _data_paths: DataPaths) -> Result<()> {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Alias", "Price Source ID"]);

        for (alias, id) in supported_coins() {
            table.add_row(vec![alias.to_string(), id.to_string()]);
        }

        println!("{}", "Supported assets".bright_white().bold());
        println!("{table}");
        println!(
            "{}",
            "Coin Type cells matching any alias (case-insensitive) get live prices.".bright_black()
        );
        Ok(())
    }
}
