//! Generic `<table>` to [`Dataset`] conversion. Anything specific to one page lives in
//! [`crate::transform`], this only knows about tables.

use crate::generic_structs::{Cell, Dataset};
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};

/// Finds the table, reads it and does the cleanup every page needs.
///
/// Returns `None` when no table matches, which callers treat as "nothing on this page".
pub fn extract(
    document: &Html,
    name: &str,
    class: Option<&str>,
    header_override: Option<&[&str]>,
) -> Option<Dataset> {
    let table = locate(document, class)?;
    let mut dataset = parse_table(table, name, header_override);
    clean_common(&mut dataset);
    debug!(
        "{}: parsed {} rows x {} columns",
        name,
        dataset.rows.len(),
        dataset.width()
    );
    Some(dataset)
}

/// First table with the given class, or simply the first table in the document
pub fn locate<'a>(document: &'a Html, class: Option<&str>) -> Option<ElementRef<'a>> {
    let selector = match class {
        Some(class) => format!("table.{}", class),
        None => String::from("table"),
    };
    let found = match Selector::parse(&selector) {
        Ok(parsed) => document.select(&parsed).next(),
        Err(e) => {
            warn!("Invalid table selector {}: {:?}", selector, e);
            None
        }
    };
    found
}

/// Turns a table element into a dataset, before any cleanup.
///
/// Headers come from the override when given, else from every `<th>` in the table. The first
/// `<tr>` is the header row and is skipped as soon as the table has more than one row. Rows
/// without `<td>` cells (spacers, header rows further down) are ignored.
pub fn parse_table(table: ElementRef, name: &str, header_override: Option<&[&str]>) -> Dataset {
    let (tr, td, th) = match (
        Selector::parse("tr"),
        Selector::parse("td"),
        Selector::parse("th"),
    ) {
        (Ok(tr), Ok(td), Ok(th)) => (tr, td, th),
        _ => return Dataset::empty(name),
    };

    let headers: Vec<String> = match header_override {
        Some(labels) => labels.iter().map(|label| label.to_string()).collect(),
        None => table.select(&th).map(cell_text).collect(),
    };

    let trs: Vec<ElementRef> = table.select(&tr).collect();
    let data_trs = if trs.len() > 1 { &trs[1..] } else { &trs[..] };
    let mut rows = vec![];
    for row in data_trs {
        let cells: Vec<String> = row.select(&td).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        rows.push(cells);
    }

    let (headers, rows) = align(headers, rows);
    Dataset::new(name, headers, rows)
}

/// Every text fragment trimmed, then glued together without separator
pub fn cell_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Makes headers and rows agree on the width of the first row.
///
/// Extra headers are cut off, missing ones become `col_N`. Shorter rows are padded with nulls,
/// longer rows cut.
fn align(mut headers: Vec<String>, rows: Vec<Vec<String>>) -> (Vec<String>, Vec<Vec<Cell>>) {
    let width = match rows.first() {
        Some(first) => first.len(),
        None => return (headers, vec![]),
    };
    if headers.len() > width {
        headers.truncate(width);
    } else {
        for idx in headers.len()..width {
            headers.push(format!("col_{}", idx + 1));
        }
    }
    let rows = rows
        .into_iter()
        .map(|row| {
            let mut cells: Vec<Cell> = row.into_iter().map(Some).collect();
            cells.resize(width, None);
            cells
        })
        .collect();
    (headers, rows)
}

/// Drops the nameless and `#` columns, flattens newlines inside cells.
pub fn clean_common(dataset: &mut Dataset) {
    if dataset.rows.is_empty() {
        return;
    }
    dataset.drop_columns_where(|header| matches!(header.trim(), "" | "#"));
    for row in &mut dataset.rows {
        for cell in row.iter_mut().flatten() {
            *cell = cell.replace('\n', " ").trim().to_owned();
        }
    }
}
