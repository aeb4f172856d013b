//! Aggregator: per-asset and grand-total rollups over enriched records.

use std::collections::HashMap;

use tracing::info;

use crate::pricing::{COL_COST_BASIS, COL_PL_USD, COL_POSITION_VALUE};
use crate::schema::{COL_COIN, COL_QUANTITY};
use crate::table::{Cell, Table};

/// Label of the synthetic grand-total row.
pub const TOTAL_LABEL: &str = "TOTAL";

pub const SUMMARY_COLUMNS: &[&str] = &[
    COL_COIN,
    COL_QUANTITY,
    COL_COST_BASIS,
    COL_POSITION_VALUE,
    COL_PL_USD,
];

#[derive(Debug, Default, Clone)]
struct GroupSums {
    quantity: f64,
    cost_basis: f64,
    position_value: f64,
    pl_usd: f64,
}

/// Roll enriched records into one row per distinct raw `Coin Type`
/// value plus a final `TOTAL` row.
///
/// Grouping is by the raw label text, original casing preserved, so
/// differently-spelled aliases of the same asset stay distinct rows.
/// Missing values count as zero in every sum. Groups appear in
/// first-seen order, `TOTAL` last.
pub fn summarize(enriched: &Table) -> Table {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupSums> = HashMap::new();

    for row in 0..enriched.row_count() {
        let label = enriched.cell(row, COL_COIN).render();
        let sums = groups.entry(label.clone()).or_insert_with(|| {
            order.push(label.clone());
            GroupSums::default()
        });
        sums.quantity += enriched.cell(row, COL_QUANTITY).as_number().unwrap_or(0.0);
        sums.cost_basis += enriched.cell(row, COL_COST_BASIS).as_number().unwrap_or(0.0);
        sums.position_value += enriched
            .cell(row, COL_POSITION_VALUE)
            .as_number()
            .unwrap_or(0.0);
        sums.pl_usd += enriched.cell(row, COL_PL_USD).as_number().unwrap_or(0.0);
    }

    let mut out = Table::new(SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect());
    let mut total = GroupSums::default();
    for label in &order {
        let sums = &groups[label];
        total.quantity += sums.quantity;
        total.cost_basis += sums.cost_basis;
        total.position_value += sums.position_value;
        total.pl_usd += sums.pl_usd;
        out.push_row(sums_row(label, sums));
    }
    out.push_row(sums_row(TOTAL_LABEL, &total));

    info!(coins = order.len(), "summary built");
    out
}

fn sums_row(label: &str, sums: &GroupSums) -> Vec<Cell> {
    vec![
        Cell::Text(label.to_string()),
        Cell::Number(sums.quantity),
        Cell::Number(sums.cost_basis),
        Cell::Number(sums.position_value),
        Cell::Number(sums.pl_usd),
    ]
}
