//! Header normalizer: maps raw spreadsheet column labels onto the
//! canonical working schema.
//!
//! Matching policy, in order:
//! 1. A raw label whose normalized form equals a canonical name claims
//!    that canonical column outright; alias matches can never displace it.
//! 2. Otherwise the label is looked up in the alias table; the first
//!    canonical field whose alias set contains it wins.
//! 3. Two raw labels claiming the same canonical field at the same
//!    priority: the later one wins (overwrite).
//! 4. Labels matching nothing are dropped silently.

use std::collections::HashMap;

use tracing::debug;

use crate::table::{Cell, Table};

use super::{
    CANONICAL_COLUMNS, COL_COST_PER_COIN, COL_FEES, COL_QUANTITY, COL_TOTAL_COST, NUMERIC_COLUMNS,
};

/// Known synonyms per canonical field, keyed by canonical name. All
/// entries are pre-normalized (lowercased, single-spaced).
const HEADER_ALIASES: &[(&str, &[&str])] = &[
    (
        super::COL_DATE,
        &[
            "date",
            "purchase date",
            "date purchased",
            "buy date",
            "purchased",
            "date of buy",
        ],
    ),
    (
        super::COL_COIN,
        &["coin", "asset", "symbol", "ticker", "currency", "crypto", "token"],
    ),
    (
        super::COL_QUANTITY,
        &["qty", "amount", "units", "coins", "number of coins"],
    ),
    (
        super::COL_COST_PER_COIN,
        &[
            "cost per coin",
            "price",
            "unit price",
            "price usd",
            "unit cost",
            "purchase price",
            "buy price",
            "price per coin",
            "cost per unit",
        ],
    ),
    (
        super::COL_FEES,
        &["fees", "fee", "fee usd", "commission", "transaction fee"],
    ),
    (
        super::COL_EXCHANGE,
        &["platform", "broker", "venue", "bought on"],
    ),
    (
        super::COL_TX_ID,
        &["tx id", "txid", "tx hash", "transaction hash", "transaction", "hash"],
    ),
    (
        super::COL_NOTES,
        &["note", "comment", "comments", "memo", "description"],
    ),
    (
        super::COL_TOTAL_COST,
        &["total cost", "total", "total usd", "cost basis", "total spent"],
    ),
];

/// Normalize a raw column label for matching: strip zero-width
/// characters, fold underscores and hyphens to spaces, collapse
/// repeated whitespace, lowercase, trim.
pub fn normalize_label(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Find the canonical field a normalized label belongs to, along with
/// whether it matched the canonical name itself rather than an alias.
fn match_canonical(normalized: &str) -> Option<(&'static str, bool)> {
    for canonical in CANONICAL_COLUMNS {
        if normalize_label(canonical) == normalized {
            return Some((*canonical, true));
        }
    }
    for (canonical, aliases) in HEADER_ALIASES {
        if aliases.contains(&normalized) {
            return Some((*canonical, false));
        }
    }
    None
}

/// Coerce a cell to floating point. Unparseable text becomes NaN,
/// never an error; empty stays empty.
fn coerce_numeric(cell: &Cell) -> Cell {
    match cell {
        Cell::Number(n) => Cell::Number(*n),
        Cell::Empty => Cell::Empty,
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                match trimmed.parse::<f64>() {
                    Ok(n) => Cell::Number(n),
                    Err(_) => Cell::Number(f64::NAN),
                }
            }
        }
    }
}

/// Map a raw table onto the canonical schema.
///
/// Produces exactly one output row per input row, with columns in
/// canonical order. Optional canonical columns absent from the input
/// are created empty; required columns appear only when the input
/// actually mapped them, so the validator can report what is missing.
/// Numeric columns are coerced; the derived total-cost column is
/// computed when the input did not supply one.
pub fn normalize_headers(raw: &Table) -> Table {
    // canonical name -> raw column index, resolved per the priority
    // rules in the module docs.
    let mut mapping: HashMap<&'static str, (usize, bool)> = HashMap::new();

    for (idx, label) in raw.columns().iter().enumerate() {
        let normalized = normalize_label(label);
        match match_canonical(&normalized) {
            Some((canonical, exact)) => {
                match mapping.get(canonical) {
                    // An exact canonical-name claim is never displaced
                    // by an alias match.
                    Some((_, true)) if !exact => {
                        debug!(label = %label, canonical, "alias match ignored; canonical name already claimed");
                    }
                    _ => {
                        mapping.insert(canonical, (idx, exact));
                    }
                }
            }
            None => {
                debug!(label = %label, "dropping unrecognized column");
            }
        }
    }

    let total_cost_supplied = mapping.contains_key(COL_TOTAL_COST);

    // Required columns survive only when the input mapped them; the
    // optional and derived ones are always materialized.
    let out_columns: Vec<&'static str> = CANONICAL_COLUMNS
        .iter()
        .copied()
        .filter(|canonical| {
            !super::REQUIRED_COLUMNS.contains(canonical) || mapping.contains_key(canonical)
        })
        .collect();

    let mut out = Table::new(out_columns.iter().map(|c| c.to_string()).collect());
    for row in raw.rows() {
        let mut cells = Vec::with_capacity(out_columns.len());
        for canonical in &out_columns {
            let cell = match mapping.get(canonical) {
                Some((idx, _)) => row.get(*idx).cloned().unwrap_or(Cell::Empty),
                None => Cell::Empty,
            };
            if NUMERIC_COLUMNS.contains(canonical) {
                cells.push(coerce_numeric(&cell));
            } else {
                cells.push(cell);
            }
        }
        out.push_row(cells);
    }

    if !total_cost_supplied {
        for row_idx in 0..out.row_count() {
            let total = derive_total_cost(&out, row_idx);
            out.set_cell(row_idx, COL_TOTAL_COST, total);
        }
    }

    out
}

/// `quantity * cost_per_coin + fees`, with fees treated as 0 when
/// missing or not a number. Empty when quantity or cost is unusable.
fn derive_total_cost(table: &Table, row: usize) -> Cell {
    let qty = table.cell(row, COL_QUANTITY).as_number();
    let cost = table.cell(row, COL_COST_PER_COIN).as_number();
    let fees = table.cell(row, COL_FEES).as_number().unwrap_or(0.0);
    match (qty, cost) {
        (Some(q), Some(c)) => Cell::Number(q * c + fees),
        _ => Cell::Empty,
    }
}
