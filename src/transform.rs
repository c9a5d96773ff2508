//! Per page fixups, applied in order after the generic table parse.

use crate::generic_structs::{Cell, Dataset};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    /// `18` in `18(3)`
    static ref LEADING_NUMBER: Regex = Regex::new(r"^(\d+)").unwrap();
    /// `3` in `18(3)`
    static ref BRACKETED_NUMBER: Regex = Regex::new(r"\((\d+)\)").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Drop every column whose label contains this, ignoring case
    DropColumnsContaining(&'static str),
    /// Split an `N(M)` column into its leading number and the optional bracketed one. The
    /// source column is the first whose label contains all of `markers`, it is dropped after.
    SplitCompound {
        markers: &'static [&'static str],
        leading: &'static str,
        bracketed: &'static str,
    },
    /// Newlines to spaces, then trim
    NormalizeColumn(&'static str),
    /// Blank cells take the closest non blank value above them
    ForwardFill(&'static str),
    /// Drop the last row when one of its cells mentions "total"
    DropTotalRow,
    /// "goals" becomes "Goals", anything with Ø or "average" becomes "Average Goals"
    CanonicalGoalLabels,
    DedupColumns,
    DropEmptyLabels,
}

impl Transform {
    pub fn apply(&self, dataset: &mut Dataset) {
        match self {
            Transform::DropColumnsContaining(needle) => {
                let needle = needle.to_lowercase();
                dataset.drop_columns_where(|header| header.to_lowercase().contains(&needle));
            }
            Transform::SplitCompound {
                markers,
                leading,
                bracketed,
            } => split_compound(dataset, markers, leading, bracketed),
            Transform::NormalizeColumn(label) => {
                if let Some(idx) = dataset.column_index(label) {
                    dataset.map_column(idx, |cell| {
                        cell.as_ref()
                            .map(|value| value.replace('\n', " ").trim().to_owned())
                    });
                }
            }
            Transform::ForwardFill(label) => forward_fill(dataset, label),
            Transform::DropTotalRow => {
                let is_total = dataset.rows.last().map_or(false, |row| {
                    row.iter()
                        .flatten()
                        .any(|cell| cell.to_lowercase().contains("total"))
                });
                if is_total {
                    debug!("{}: dropping trailing total row", dataset.name);
                    dataset.rows.pop();
                }
            }
            Transform::CanonicalGoalLabels => {
                for header in &mut dataset.headers {
                    let lower = header.to_lowercase();
                    if lower.trim() == "goals" {
                        *header = String::from("Goals");
                    }
                    if lower.contains('ø') || lower.contains("average") {
                        *header = String::from("Average Goals");
                    }
                }
            }
            Transform::DedupColumns => dataset.dedup_columns(),
            Transform::DropEmptyLabels => dataset.drop_columns_where(|header| header.is_empty()),
        }
    }
}

fn split_compound(dataset: &mut Dataset, markers: &[&str], leading: &str, bracketed: &str) {
    let source = match dataset
        .headers
        .iter()
        .find(|header| markers.iter().all(|marker| header.contains(marker)))
    {
        Some(source) => source.clone(),
        None => return,
    };
    let values: Vec<Cell> = dataset
        .column(&source)
        .unwrap_or_default()
        .into_iter()
        .cloned()
        .collect();
    let capture = |pattern: &Regex, cell: &Cell| -> Cell {
        let text = cell.as_deref()?;
        Some(pattern.captures(text)?.get(1)?.as_str().to_owned())
    };
    let leading_values = values.iter().map(|c| capture(&LEADING_NUMBER, c)).collect();
    let bracketed_values = values.iter().map(|c| capture(&BRACKETED_NUMBER, c)).collect();
    dataset.set_column(leading, leading_values);
    dataset.set_column(bracketed, bracketed_values);
    if source != leading && source != bracketed {
        dataset.drop_columns_where(|header| header == source);
    }
}

/// Leading blanks have nothing to copy and become null.
fn forward_fill(dataset: &mut Dataset, label: &str) {
    let idx = match dataset.column_index(label) {
        Some(idx) => idx,
        None => return,
    };
    let mut last: Cell = None;
    dataset.map_column(idx, |cell| match cell {
        Some(value) if !value.trim().is_empty() => {
            last = cell.clone();
            last.clone()
        }
        _ => last.clone(),
    });
}
