//! Output writers: multi-sheet xlsx workbook and CSV.

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::info;

use crate::table::{Cell, Table};

use super::{HOLDINGS_SHEET, SUMMARY_SHEET};

/// Write the enriched records and summary as a two-sheet workbook.
pub fn write_workbook(path: &Path, enriched: &Table, summary: &Table) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }

    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), HOLDINGS_SHEET, enriched)?;
    write_sheet(workbook.add_worksheet(), SUMMARY_SHEET, summary)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))?;

    info!(output = %path.display(), rows = enriched.row_count(), "workbook written");
    Ok(())
}

fn write_sheet(sheet: &mut Worksheet, name: &str, table: &Table) -> Result<()> {
    sheet
        .set_name(name)
        .with_context(|| format!("Invalid worksheet name: {}", name))?;

    let header_format = Format::new().set_bold();
    for (col, label) in table.columns().iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, label, &header_format)
            .context("Failed to write header cell")?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let out_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = col_idx as u16;
            match cell {
                Cell::Number(n) if n.is_finite() => {
                    sheet
                        .write_number(out_row, col, *n)
                        .context("Failed to write numeric cell")?;
                }
                Cell::Text(s) => {
                    sheet
                        .write_string(out_row, col, s)
                        .context("Failed to write text cell")?;
                }
                // Missing values stay blank.
                _ => {}
            }
        }
    }
    Ok(())
}

/// Write a table as CSV, missing values as empty fields.
pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV: {}", path.display()))?;
    writer
        .write_record(table.columns())
        .context("Failed to write CSV header")?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|c| c.render()))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV")?;

    info!(output = %path.display(), rows = table.row_count(), "csv written");
    Ok(())
}
