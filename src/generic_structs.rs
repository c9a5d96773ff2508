use serde::Serialize;
use std::fmt;

/// One cell of a table. `None` is a null and ends up as NULL in the database.
pub type Cell = Option<String>;

/// A table pulled off a page: header row plus records, named after the source that produced it.
///
/// Every record has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Dataset {
            name: name.to_owned(),
            headers,
            rows,
        }
    }

    /// No rows and no columns
    pub fn empty(name: &str) -> Self {
        Dataset::new(name, vec![], vec![])
    }

    /// No rows or no columns left. Empty datasets are never persisted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Position of the first column carrying exactly this label
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == label)
    }

    /// Values of the first column carrying this label, top to bottom
    pub fn column(&self, label: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Removes every column for which `drop` returns true on its label.
    pub fn drop_columns_where<P>(&mut self, drop: P)
    where
        P: Fn(&str) -> bool,
    {
        let keep: Vec<bool> = self.headers.iter().map(|h| !drop(h)).collect();
        self.retain_columns(&keep);
    }

    /// Keeps the first occurrence of every label
    pub fn dedup_columns(&mut self) {
        let mut keep = Vec::with_capacity(self.headers.len());
        for (idx, header) in self.headers.iter().enumerate() {
            keep.push(!self.headers[..idx].contains(header));
        }
        self.retain_columns(&keep);
    }

    fn retain_columns(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.headers.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// Overwrites the first column with this label, or appends a new one at the end.
    /// `values` must have one entry per row.
    pub fn set_column(&mut self, label: &str, values: Vec<Cell>) {
        match self.column_index(label) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(label.to_owned());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Applies `f` to every cell of the column at `idx`
    pub fn map_column<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(idx) {
                *cell = f(cell);
            }
        }
    }

    /// Glues several datasets together, rows kept in order.
    ///
    /// Columns are matched on label and on how many times that label was seen before in the
    /// same part, so duplicate labels survive. Columns show up in order of first appearance and
    /// a column a part does not have is null for that part's rows.
    pub fn concat(name: &str, parts: Vec<Dataset>) -> Dataset {
        let mut keys: Vec<(String, usize)> = vec![];
        let mut rows = vec![];
        for part in parts {
            let positions: Vec<usize> = occurrence_keys(&part.headers)
                .into_iter()
                .map(|key| match keys.iter().position(|k| *k == key) {
                    Some(pos) => pos,
                    None => {
                        keys.push(key);
                        keys.len() - 1
                    }
                })
                .collect();
            for row in part.rows {
                let mut aligned = vec![None; keys.len()];
                for (cell, &pos) in row.into_iter().zip(&positions) {
                    aligned[pos] = cell;
                }
                rows.push(aligned);
            }
        }
        // Parts seen early do not know about columns added later on
        for row in &mut rows {
            row.resize(keys.len(), None);
        }
        let headers = keys.into_iter().map(|(label, _)| label).collect();
        Dataset::new(name, headers, rows)
    }

    /// Copy holding only the first `n` rows
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            name: self.name.clone(),
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

fn occurrence_keys(headers: &[String]) -> Vec<(String, usize)> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let seen = headers[..idx].iter().filter(|h| *h == header).count();
            (header.clone(), seen)
        })
        .collect()
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} ({} rows x {} columns)",
            self.name,
            self.rows.len(),
            self.headers.len()
        )?;
        writeln!(f, "{}", self.headers.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<&str> = row
                .iter()
                .map(|cell| cell.as_deref().unwrap_or("NULL"))
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}
