//! Table formatting utilities

use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// Add a row; numeric columns are right-aligned
pub fn add_table_row<I, S>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    let row = cells
        .into_iter()
        .map(|cell| {
            let text = cell.to_string();
            if text.parse::<f64>().is_ok() {
                Cell::new(&text).style_spec("r")
            } else {
                Cell::new(&text)
            }
        })
        .collect();
    table.add_row(Row::new(row));
}
