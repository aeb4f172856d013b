//! Pricing enricher: current price, position value, and unrealized P/L
//! per canonical record.
//!
//! Lookups go through the [`PriceSource`] trait so the live CoinGecko
//! client and test fakes are interchangeable. Results (successes and
//! failures both) are cached per price-source id for the duration of a
//! run, and a pacing delay precedes each live lookup to stay under
//! external rate limits.

pub mod client;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::schema::{COL_COIN, COL_QUANTITY, COL_TOTAL_COST};
use crate::table::{Cell, Table};

pub use client::{CoinGeckoClient, PriceError};

/// Enriched columns appended to the canonical record set, in order.
pub const COL_CURRENT_PRICE: &str = "Current Price (USD)";
pub const COL_POSITION_VALUE: &str = "Position Value (USD)";
pub const COL_COST_BASIS: &str = "Cost Basis (USD)";
pub const COL_PL_USD: &str = "Unrealized P/L (USD)";
pub const COL_PL_PCT: &str = "Unrealized P/L (%)";

pub const ENRICHED_COLUMNS: &[&str] = &[
    COL_CURRENT_PRICE,
    COL_POSITION_VALUE,
    COL_COST_BASIS,
    COL_PL_USD,
    COL_PL_PCT,
];

/// Static coin-label to price-source id table. Symbol and full name
/// both resolve to the same CoinGecko id.
const COIN_ALIASES: &[(&str, &str)] = &[
    ("bitcoin", "bitcoin"),
    ("btc", "bitcoin"),
    ("ethereum", "ethereum"),
    ("eth", "ethereum"),
    ("cardano", "cardano"),
    ("ada", "cardano"),
    ("solana", "solana"),
    ("sol", "solana"),
    ("dogecoin", "dogecoin"),
    ("doge", "dogecoin"),
    ("hedera", "hedera-hashgraph"),
    ("hbar", "hedera-hashgraph"),
    ("ripple", "ripple"),
    ("xrp", "ripple"),
    ("stellar", "stellar"),
    ("xlm", "stellar"),
];

/// Resolve a coin key (trimmed, lowercased asset label) to its
/// price-source id.
pub fn resolve_coin_id(coin_key: &str) -> Option<&'static str> {
    COIN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == coin_key)
        .map(|(_, id)| *id)
}

/// All (alias, id) pairs, for the `coins` listing command.
pub fn supported_coins() -> &'static [(&'static str, &'static str)] {
    COIN_ALIASES
}

/// A current-price source keyed by price-source id.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current USD price for the given id. Implementations own their
    /// retry/backoff handling and must return in bounded time.
    async fn price_usd(&self, coin_id: &str) -> Result<f64, PriceError>;
}

/// Per-run price cache. Failures are cached alongside successes so a
/// failing id is only attempted once per run.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: HashMap<String, Result<f64, String>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coin_id: &str) -> Option<&Result<f64, String>> {
        self.entries.get(coin_id)
    }

    pub fn insert(&mut self, coin_id: &str, result: Result<f64, String>) {
        self.entries.insert(coin_id.to_string(), result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Enrichment options.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Skip all live lookups; only cost basis is computed.
    pub offline: bool,
    /// Pacing delay before each live lookup.
    pub delay_ms: u64,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            offline: false,
            delay_ms: 1000,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Enrich a validated canonical record set with pricing columns.
///
/// Every record is processed; per-record failures (unrecognized asset,
/// lookup failure, unusable cost basis) degrade that record's derived
/// fields to empty and never abort the run.
pub async fn enrich(
    records: &Table,
    source: &dyn PriceSource,
    cache: &mut PriceCache,
    opts: &EnrichOptions,
) -> Result<Table> {
    let mut out = records.clone();
    for col in ENRICHED_COLUMNS {
        out.add_column(col, Cell::Empty);
    }

    for row in 0..out.row_count() {
        let qty = out.cell(row, COL_QUANTITY).as_number();
        let total_cost = out.cell(row, COL_TOTAL_COST).as_number();

        let cost_basis = match (qty, total_cost) {
            (_, Some(total)) => {
                let basis = round2(total);
                out.set_cell(row, COL_COST_BASIS, Cell::Number(basis));
                Some(basis)
            }
            _ => None,
        };

        if opts.offline {
            continue;
        }

        let coin_key = match out.cell(row, COL_COIN) {
            Cell::Text(s) => s.trim().to_lowercase(),
            Cell::Number(n) if n.is_finite() => format!("{}", n),
            _ => {
                warn!(row, "record has no coin type; skipping price lookup");
                continue;
            }
        };

        let coin_id = match resolve_coin_id(&coin_key) {
            Some(id) => id,
            None => {
                warn!(row, coin = %coin_key, "unrecognized asset; price fields left empty");
                continue;
            }
        };

        // A zero or unusable cost basis can never be divided by; leave
        // every price-derived field empty for this record.
        let basis = match cost_basis {
            Some(b) if b != 0.0 => b,
            _ => {
                warn!(row, coin = %coin_key, "zero or missing cost basis; price fields left empty");
                continue;
            }
        };

        // Position value is price * quantity; without a numeric
        // quantity there is nothing to derive.
        let quantity = match qty {
            Some(q) => q,
            None => {
                warn!(row, coin = %coin_key, "non-numeric quantity; price fields left empty");
                continue;
            }
        };

        let cached = match cache.get(coin_id) {
            Some(result) => result.clone(),
            None => {
                if opts.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(opts.delay_ms)).await;
                }
                debug!(coin_id, "fetching current price");
                let result = source
                    .price_usd(coin_id)
                    .await
                    .map_err(|e| e.to_string());
                cache.insert(coin_id, result.clone());
                result
            }
        };

        match cached {
            Ok(price) => {
                let position_value = round2(price * quantity);
                let pl_usd = round2(position_value - basis);
                let pl_pct = round2(pl_usd / basis * 100.0);
                out.set_cell(row, COL_CURRENT_PRICE, Cell::Number(price));
                out.set_cell(row, COL_POSITION_VALUE, Cell::Number(position_value));
                out.set_cell(row, COL_PL_USD, Cell::Number(pl_usd));
                out.set_cell(row, COL_PL_PCT, Cell::Number(pl_pct));
            }
            Err(reason) => {
                warn!(row, coin_id, %reason, "price lookup failed; price fields left empty");
            }
        }
    }

    if !opts.offline {
        info!(
            records = out.row_count(),
            lookups = cache.len(),
            "enrichment complete"
        );
    }
    Ok(out)
}
