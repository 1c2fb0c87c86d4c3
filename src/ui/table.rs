//! ui::table
//!
//! Borderless tables for resource listings.

use comfy_table::{presets::NOTHING, Attribute, Cell, ContentArrangement, Table};

/// Gap between columns.
const COLUMN_PADDING: (u16, u16) = (0, 2);

/// A table with no borders whose columns never wrap.
pub fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Disabled);
    table
}

/// A [`styled_table`] with a bold header row and two spaces between columns.
pub fn resource_table(headers: &[&str]) -> Table {
    let mut table = styled_table();
    table.set_header(headers.iter().map(|h| header(h)));
    apply_column_padding(&mut table, COLUMN_PADDING);
    table
}

pub fn apply_column_padding(table: &mut Table, padding: (u16, u16)) {
    for i in 0..table.column_count() {
        if let Some(column) = table.column_mut(i) {
            column.set_padding(padding);
        }
    }
}

pub fn header(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .add_attribute(Attribute::Dim)
}

/// Truncate to `max` characters, marking the cut with `...`.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
