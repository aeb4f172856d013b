//! Ordered named-column table model shared by every pipeline stage.
//!
//! Every stage of the pipeline (normalize, validate, enrich, summarize,
//! write) consumes and produces a [`Table`]: a stable column order plus
//! rectangular rows of scalar cells. This is the in-memory form of the
//! raw spreadsheet, the canonical record set, and the enriched output.

use serde::{Deserialize, Serialize};

/// A single scalar spreadsheet cell.
///
/// Numeric cells may hold NaN: the normalizer coerces unparseable
/// numeric input to `Number(f64::NAN)` rather than erroring, and
/// downstream stages treat NaN the same as a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// The cell as a finite number, if it is one. NaN and infinities
    /// count as "not a number" and return `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for `Empty` and for non-finite numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(n) => !n.is_finite(),
            Cell::Text(_) => false,
        }
    }

    /// Render the cell for CSV and console output. Missing values
    /// render as an empty string.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.is_finite() => format!("{}", n),
            _ => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// A rectangular table with named, ordered columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding or truncating it to the column count so
    /// the table stays rectangular.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column name). `Cell::Empty` when the column does
    /// not exist.
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.column_index(column)
            .and_then(|idx| self.rows.get(row).and_then(|r| r.get(idx)))
            .unwrap_or(&EMPTY)
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: Cell) {
        if let Some(idx) = self.column_index(column) {
            if let Some(r) = self.rows.get_mut(row) {
                r[idx] = value;
            }
        }
    }

    /// Append a column, filling existing rows with the given value.
    /// Returns the new column's index.
    pub fn add_column(&mut self, name: &str, fill: Cell) -> usize {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(fill.clone());
        }
        self.columns.len() - 1
    }
}
