//! Output formatting utilities for CLI commands
//!
//! Tables go through comfy-table; `--json` output is pretty-printed serde.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use stocktake_model::{Discrepancy, DiscrepancyCounts, DiscrepancyKind};

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = new_table(headers);
    for row in rows {
        table.add_row(row);
    }
    println!("{}", table);
}

pub fn print_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) {
    let mut table = new_table(headers);
    for row in rows {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|(text, color)| match color {
                Some(c) => Cell::new(text).fg(c),
                None => Cell::new(text),
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);
    table
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Placeholder for absent optional columns.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

pub fn kind_color(kind: DiscrepancyKind) -> Color {
    match kind {
        DiscrepancyKind::Match => Color::Green,
        DiscrepancyKind::Missing => Color::Red,
        DiscrepancyKind::Unexpected => Color::Yellow,
    }
}

/// Discrepancy table followed by the counts line.
pub fn print_discrepancies(discrepancies: &[Discrepancy], counts: &DiscrepancyCounts) {
    if discrepancies.is_empty() {
        println!("No registered assets and nothing scanned.");
    } else {
        let rows = discrepancies
            .iter()
            .map(|d| {
                let asset = d.asset();
                let location = asset.location.as_ref().map(|l| l.name.as_str());
                vec![
                    (d.kind().as_str().to_string(), Some(kind_color(d.kind()))),
                    (asset.asset_tag.clone(), None),
                    (asset.name.clone(), None),
                    (or_dash(location), None),
                    (or_dash(d.scanned_code()), None),
                    (relocate_hint(d), None),
                ]
            })
            .collect();
        print_table_colored(
            &["Status", "Tag", "Name", "Recorded location", "Scanned", "Action"],
            rows,
        );
    }
    println!("{}", format_counts(counts));
}

fn relocate_hint(discrepancy: &Discrepancy) -> String {
    if discrepancy.can_relocate() {
        format!(":relocate {}", discrepancy.asset().id)
    } else {
        String::new()
    }
}

pub fn format_counts(counts: &DiscrepancyCounts) -> String {
    format!(
        "Scanned: {}  Matches: {}  Missing: {}  Unexpected: {}",
        counts.scanned, counts.matches, counts.missing, counts.unexpected
    )
}
