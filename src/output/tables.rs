use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Percentage of the codebase, brighter for dominant languages.
pub fn language_share_cell(share: f64) -> Cell {
    let text = format!("{share:.1}%");
    if share >= 50.0 {
        Cell::new(text).fg(TableColor::Green)
    } else if share >= 10.0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::DarkGrey)
    }
}

pub fn optional_cell(value: Option<impl ToString>) -> Cell {
    value.map_or_else(
        || Cell::new("N/A").fg(TableColor::DarkGrey),
        |v| Cell::new(v.to_string()),
    )
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let value = bytes as f64;
    if value >= 1024.0 * 1024.0 {
        format!("{:.1} MiB", value / (1024.0 * 1024.0))
    } else if value >= 1024.0 {
        format!("{:.1} KiB", value / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 + 512 * 1024), "3.5 MiB");
    }

    #[test]
    fn test_optional_cell_placeholder() {
        assert_eq!(optional_cell(None::<u64>).content(), "N/A");
        assert_eq!(optional_cell(Some(42)).content(), "42");
    }
}
