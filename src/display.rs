//! Console rendering of pipeline results.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table as ConsoleTable};
use owo_colors::OwoColorize;

use crate::summary::TOTAL_LABEL;
use crate::table::{Cell, Table};

/// Render the summary table to stdout.
pub fn print_summary(summary: &Table) {
    let mut console = ConsoleTable::new();
    console
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(summary.columns().to_vec());

    for row in summary.rows() {
        console.add_row(row.iter().map(render_cell).collect::<Vec<_>>());
    }

    println!();
    println!("{}", "Portfolio Summary".bright_white().bold());
    println!("{console}");
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if n.is_finite() => format!("{:.2}", n),
        Cell::Text(s) if s == TOTAL_LABEL => s.bold().to_string(),
        other => other.render(),
    }
}

/// Completion line for a written output target.
pub fn print_wrote(label: &str, target: &str) {
    println!(
        "{} {} {}",
        "[OK]".bright_green(),
        format!("Wrote {}:", label).bright_black(),
        target
    );
}
