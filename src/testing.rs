//! Stand-ins for the network and the database.

use crate::error::SinkError;
use crate::fetch::Fetch;
use crate::generic_structs::Dataset;
use crate::sink::Sink;
use async_trait::async_trait;
use scraper::Html;
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves canned HTML per URL, anything else fails like an unreachable page
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_owned(), html.to_owned());
        self
    }

    /// Every URL asked for, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Fetch for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Option<Html> {
        self.requested.borrow_mut().push(url.to_owned());
        self.pages.get(url).map(|html| Html::parse_document(html))
    }
}

/// Keeps whatever it is given, or fails for the listed table names
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub written: Vec<(String, Dataset)>,
    pub attempted: Vec<String>,
    failing: Vec<String>,
}

impl RecordingSink {
    pub fn failing_on(names: &[&str]) -> Self {
        RecordingSink {
            failing: names.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait(?Send)]
impl Sink for RecordingSink {
    async fn replace_table(&mut self, name: &str, dataset: &Dataset) -> Result<(), SinkError> {
        self.attempted.push(name.to_owned());
        if self.failing.iter().any(|failing| failing == name) {
            return Err(SinkError::Database(sqlx::Error::PoolTimedOut));
        }
        self.written.retain(|(written, _)| written != name);
        self.written.push((name.to_owned(), dataset.clone()));
        Ok(())
    }
}
