//! Optional SQLite sink for the canonical record set.
//!
//! The load is a destructive replace: the `holdings` table is cleared
//! and re-inserted inside one transaction, so readers never observe a
//! partial load.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

use crate::schema::{
    COL_COIN, COL_COST_PER_COIN, COL_DATE, COL_EXCHANGE, COL_FEES, COL_NOTES, COL_QUANTITY,
    COL_TOTAL_COST, COL_TX_ID,
};
use crate::table::{Cell, Table};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS holdings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date_of_purchase TEXT,
    coin_type TEXT,
    quantity REAL,
    cost_per_coin_usd REAL,
    fees_usd REAL,
    exchange TEXT,
    tx_id TEXT,
    notes TEXT,
    total_cost_usd REAL
)";

/// Replace the `holdings` table contents with the given canonical
/// records. Returns the number of rows inserted.
pub fn load_holdings(path: &Path, records: &Table) -> Result<usize> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    conn.execute(CREATE_TABLE, [])
        .context("Failed to create holdings table")?;

    let tx = conn.transaction().context("Failed to begin transaction")?;
    tx.execute("DELETE FROM holdings", [])
        .context("Failed to clear holdings table")?;

    let mut inserted = 0usize;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO holdings (
                    date_of_purchase, coin_type, quantity, cost_per_coin_usd,
                    fees_usd, exchange, tx_id, notes, total_cost_usd
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .context("Failed to prepare insert")?;

        for row in 0..records.row_count() {
            stmt.execute(params![
                text_field(records.cell(row, COL_DATE)),
                text_field(records.cell(row, COL_COIN)),
                numeric_field(records.cell(row, COL_QUANTITY)),
                numeric_field(records.cell(row, COL_COST_PER_COIN)),
                numeric_field(records.cell(row, COL_FEES)),
                text_field(records.cell(row, COL_EXCHANGE)),
                text_field(records.cell(row, COL_TX_ID)),
                text_field(records.cell(row, COL_NOTES)),
                numeric_field(records.cell(row, COL_TOTAL_COST)),
            ])
            .context("Failed to insert holding")?;
            inserted += 1;
        }
    }
    tx.commit().context("Failed to commit holdings load")?;

    info!(rows = inserted, database = %path.display(), "holdings loaded");
    Ok(inserted)
}

fn text_field(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        other => Some(other.render()),
    }
}

fn numeric_field(cell: &Cell) -> Option<f64> {
    cell.as_number()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize_headers;

    fn sample_records() -> Table {
        let mut raw = Table::new(vec![
            "Date of Purchase".to_string(),
            "Coin".to_string(),
            "Qty".to_string(),
            "Price".to_string(),
        ]);
        raw.push_row(vec![
            Cell::from("2025-01-01"),
            Cell::from("BTC"),
            Cell::Number(0.5),
            Cell::Number(20000.0),
        ]);
        raw.push_row(vec![
            Cell::from("2025-01-02"),
            Cell::from("ETH"),
            Cell::Number(2.0),
            Cell::Number(2500.0),
        ]);
        normalize_headers(&raw)
    }

    #[test]
    fn test_load_returns_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("holdings.db");
        let count = load_holdings(&db, &sample_records()).unwrap();
        assert_eq!(count, 2);

        let conn = Connection::open(&db).unwrap();
        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM holdings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 2);
        let total: f64 = conn
            .query_row(
                "SELECT total_cost_usd FROM holdings WHERE coin_type = 'BTC'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(total, 10000.0);
    }

    #[test]
    fn test_reload_replaces_not_appends() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("holdings.db");
        load_holdings(&db, &sample_records()).unwrap();
        let count = load_holdings(&db, &sample_records()).unwrap();
        assert_eq!(count, 2);

        let conn = Connection::open(&db).unwrap();
        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM holdings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 2);
    }

    #[test]
    fn test_missing_values_stored_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("holdings.db");
        let mut raw = Table::new(vec!["Coin".to_string(), "Qty".to_string()]);
        raw.push_row(vec![Cell::from("BTC"), Cell::from("bad")]);
        load_holdings(&db, &normalize_headers(&raw)).unwrap();

        let conn = Connection::open(&db).unwrap();
        let qty: Option<f64> = conn
            .query_row("SELECT quantity FROM holdings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(qty, None);
    }
}
