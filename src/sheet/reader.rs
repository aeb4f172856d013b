//! Input readers: xlsx via calamine, csv via the csv crate.

use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::table::{Cell, Table};

/// Read an input file into a raw table, dispatching on extension.
/// The first row is taken as the header row.
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let table = match extension.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xls" | "xlsm" | "ods" => read_spreadsheet(path)?,
        other => bail!("Unsupported input format '{}': {}", other, path.display()),
    };
    info!(
        rows = table.row_count(),
        columns = table.columns().len(),
        input = %path.display(),
        "input loaded"
    );
    Ok(table)
}

/// Pick the worksheet to read: one whose name mentions transactions or
/// holdings if present, otherwise the first.
fn pick_sheet(names: &[String]) -> Option<String> {
    names
        .iter()
        .find(|n| {
            let lower = n.to_lowercase();
            lower.contains("transaction") || lower.contains("holding")
        })
        .or_else(|| names.first())
        .cloned()
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to read spreadsheet: {}", path.display()))?;

    let sheet_name = pick_sheet(&workbook.sheet_names())
        .with_context(|| format!("No worksheets in {}", path.display()))?;
    debug!(sheet = %sheet_name, "reading worksheet");

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet_name))?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Table::new(Vec::new())),
    };

    let columns: Vec<String> = header.iter().map(render_header).collect();
    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect());
    }
    Ok(table)
}

fn render_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Text(naive.format("%Y-%m-%d").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{:?}", e)),
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;
        table.push_row(record.iter().map(parse_csv_cell).collect());
    }
    Ok(table)
}

/// CSV carries no types; numbers are recognized by parsing.
fn parse_csv_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else if let Ok(n) = trimmed.parse::<f64>() {
        Cell::Number(n)
    } else {
        Cell::Text(field.to_string())
    }
}
