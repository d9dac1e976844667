//! Crawl submission: URL validation and forwarding to the crawl queue.

use thiserror::Error;
use tracing::info;
use url::Url;

use super::crunchy_api::{CrunchyApiClient, CrunchyApiError};

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("no urls supplied")]
    Empty,
    #[error("invalid urls: {}", .0.join(", "))]
    InvalidUrls(Vec<String>),
    #[error(transparent)]
    Upstream(#[from] CrunchyApiError),
}

pub struct CrawlService {
    crunchy: CrunchyApiClient,
}

impl CrawlService {
    pub fn new(crunchy: CrunchyApiClient) -> Self {
        Self { crunchy }
    }

    /// Every entry must parse as an absolute URL, otherwise the whole batch
    /// is rejected with the offending entries listed. Blank lines from the
    /// submission textarea are skipped.
    pub fn validate(urls: &[String]) -> Result<Vec<Url>, CrawlError> {
        let entries: Vec<&String> = urls.iter().filter(|u| !u.trim().is_empty()).collect();
        if entries.is_empty() {
            return Err(CrawlError::Empty);
        }

        let mut valid = Vec::with_capacity(entries.len());
        let mut invalid = Vec::new();
        for entry in entries {
            match Url::parse(entry) {
                Ok(url) => valid.push(url),
                Err(_) => invalid.push(entry.clone()),
            }
        }
        if !invalid.is_empty() {
            return Err(CrawlError::InvalidUrls(invalid));
        }
        Ok(valid)
    }

    /// Validate and push the batch onto the upstream crawl queue. Returns the
    /// number of URLs queued.
    pub async fn submit(&self, urls: &[String]) -> Result<usize, CrawlError> {
        let valid = Self::validate(urls)?;
        let as_strings: Vec<String> = valid.iter().map(|u| u.to_string()).collect();
        self.crunchy.create_crawl(&as_strings).await?;
        info!(count = as_strings.len(), "crawl batch pushed to queue");
        Ok(as_strings.len())
    }
}
