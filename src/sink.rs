//! Writing datasets away. Each write replaces the whole table of the same name, or leaves the
//! previous one untouched when something goes wrong halfway.

use crate::error::SinkError;
use crate::generic_structs::{Cell, Dataset};
use async_trait::async_trait;
use log::{error, info, warn};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::fmt;

/// Postgres refuses statements with more bind parameters than this
const BIND_LIMIT: usize = 65_535;

/// What happened to one dataset
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Written { rows: usize },
    /// Empty dataset, nothing was sent
    Skipped,
    Failed(String),
}

impl fmt::Display for PersistOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PersistOutcome::Written { rows } => write!(f, "written ({} rows)", rows),
            PersistOutcome::Skipped => write!(f, "skipped (empty)"),
            PersistOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[async_trait(?Send)]
pub trait Sink {
    /// Drops `name` if it exists and recreates it holding exactly `dataset`
    async fn replace_table(&mut self, name: &str, dataset: &Dataset) -> Result<(), SinkError>;
}

/// Hands a dataset to the sink unless it is empty. Never fails, errors end up in the outcome.
pub async fn persist<S>(sink: &mut S, name: &str, dataset: &Dataset) -> PersistOutcome
where
    S: Sink + ?Sized,
{
    if dataset.is_empty() {
        warn!("{} returned an empty dataset, skipping.", name);
        return PersistOutcome::Skipped;
    }
    info!("Uploading {} to PostgreSQL...", name);
    match sink.replace_table(name, dataset).await {
        Ok(()) => {
            info!("{} uploaded successfully ({} rows)", name, dataset.rows.len());
            PersistOutcome::Written {
                rows: dataset.rows.len(),
            }
        }
        Err(e) => {
            error!("Error uploading {}: {}", name, e);
            PersistOutcome::Failed(e.to_string())
        }
    }
}

pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    /// No connection is made until the first write, so an unreachable database shows up as
    /// failed writes instead of a failed start.
    pub fn connect_lazy(url: &str) -> Result<Self, SinkError> {
        let pool = PgPoolOptions::new().max_connections(1).connect_lazy(url)?;
        Ok(PgSink { pool })
    }
}

#[async_trait(?Send)]
impl Sink for PgSink {
    async fn replace_table(&mut self, name: &str, dataset: &Dataset) -> Result<(), SinkError> {
        if dataset.headers.is_empty() {
            return Err(SinkError::NoColumns(name.to_owned()));
        }
        let table = quote_ident(name);
        let columns: Vec<String> = unique_labels(&dataset.headers)
            .iter()
            .map(|label| quote_ident(label))
            .collect();
        let definitions: Vec<String> = columns.iter().map(|c| format!("{} TEXT", c)).collect();

        // Dropping the transaction without commit rolls everything back
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE TABLE {} ({})",
            table,
            definitions.join(", ")
        ))
        .execute(&mut *tx)
        .await?;
        for chunk in dataset.rows.chunks(rows_per_insert(columns.len())) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, columns.join(", ")));
            builder.push_values(chunk, |mut values, row: &Vec<Cell>| {
                for cell in row {
                    values.push_bind(cell.clone());
                }
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Double quoted identifier, embedded quotes doubled
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Repeated labels get `_2`, `_3`, ... so they can all be column names
fn unique_labels(headers: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let mut label = header.clone();
        let mut n = 1;
        while labels.contains(&label) {
            n += 1;
            label = format!("{}_{}", header, n);
        }
        labels.push(label);
    }
    labels
}

fn rows_per_insert(width: usize) -> usize {
    (BIND_LIMIT / width.max(1)).max(1)
}
