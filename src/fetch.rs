//! Getting pages off the web. Failures never leave this module, they turn into `None`.

use crate::error::FetchError;
use async_trait::async_trait;
use log::{debug, warn};
use scraper::Html;
use std::time::Duration;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const TIMEOUT: Duration = Duration::from_secs(20);

/// Anything that can turn a URL into a parsed page.
///
/// Parsed pages are not `Send`, hence `?Send`.
#[async_trait(?Send)]
pub trait Fetch {
    /// `None` when the page could not be retrieved, the reason has been logged already
    async fn fetch(&self, url: &str) -> Option<Html>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Ok(HttpFetcher {
            client: create_client()?,
        })
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait(?Send)]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<Html> {
        debug!("Fetching data from {}", url);
        match self.get(url).await {
            Ok(content) => Some(Html::parse_document(&content)),
            Err(e) => {
                warn!("Request failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// Browser looking client, every source gets the same one
fn create_client() -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static("en-GB,en-US;q=0.7,en;q=0.3"),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    reqwest::ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .default_headers(headers)
        .build()
}
