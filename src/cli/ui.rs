use crate::core::Quote;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Creates a cell for error text.
pub fn error_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Red)
}

pub fn quote_header() -> Vec<Cell> {
    vec![
        header_cell("Pair"),
        header_cell("Rate"),
        header_cell("Observed (UTC)"),
        header_cell("Id"),
    ]
}

pub fn quote_row(quote: &Quote) -> Vec<Cell> {
    vec![
        Cell::new(quote.pair.to_string()),
        Cell::new(quote.rate.to_string())
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right),
        Cell::new(quote.observed_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        Cell::new(quote.id.to_string()).fg(Color::DarkGrey),
    ]
}

/// Renders quotes as a table.
pub fn quotes_table<'a>(quotes: impl IntoIterator<Item = &'a Quote>) -> String {
    let mut table = new_styled_table();
    table.set_header(quote_header());
    for quote in quotes {
        table.add_row(quote_row(quote));
    }
    table.to_string()
}
