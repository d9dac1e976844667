//! Client for the upstream Crunchy REST data API (companies, industries,
//! settings, crawl queue, knowledge-graph connections).

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

#[derive(Debug, Clone, Error)]
pub enum CrunchyApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Serde(String),
}

impl CrunchyApiError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            Self::Serde(_) => false,
        }
    }
}

/// A company record as served by the upstream store. The store is schemaless,
/// so every field tolerates absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub funding: String,
    pub funding_usd: Option<f64>,
    pub website: String,
    pub crunchbase_url: String,
    pub logo: String,
    pub founders: Vec<String>,
    pub similar_companies: Vec<String>,
    pub description: String,
    pub long_description: String,
    pub acquired: Option<String>,
    pub industries: Vec<String>,
    pub founded: String,
    pub lastfunding: String,
    pub stocksymbol: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Page-number pagination envelope (upstream page size is fixed at 100).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompanyPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Company>,
}

/// One column filter from the dashboard table, `{ id, value }`. The value is
/// free-form: a substring for text columns, a string array for industries, a
/// `[min, max]` pair for funding.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ColumnFilter {
    pub id: String,
    pub value: Value,
}

/// One column sort from the dashboard table, `{ id, desc }`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ColumnSort {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

/// Listing parameters forwarded to the upstream companies endpoint.
#[derive(Debug, Clone, Default)]
pub struct CompanyListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub filters: Vec<ColumnFilter>,
    pub sorting: Vec<ColumnSort>,
}

impl CompanyListQuery {
    /// Encode as the query parameters the upstream expects: table state goes
    /// over the wire as JSON-encoded `filters` / `sorting` strings.
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if !self.filters.is_empty() {
            pairs.push(("filters", serde_json::to_string(&self.filters)?));
        }
        if !self.sorting.is_empty() {
            pairs.push(("sorting", serde_json::to_string(&self.sorting)?));
        }
        Ok(pairs)
    }
}

/// Sort order for the industry aggregation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, TS,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum IndustrySort {
    #[default]
    Default,
    IndustryCount,
    Alphabetical,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct IndustryCount {
    pub industry: String,
    pub count: u64,
}

/// Industry preferences: everything known upstream plus the subset the user
/// marked as interesting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct IndustrySettings {
    pub industries: Vec<String>,
    pub interested_industries: Vec<String>,
}

/// Crawl-queue depths per source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct PendingCounts {
    pub crunchbase: u64,
    pub tracxn: u64,
}

/// What a knowledge-graph connection lookup should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, TS)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionKey {
    Company,
    Founder,
    Industry,
}

/// The entity a connection lookup starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSubject {
    Company(String),
    Founder(String),
    Industry(String),
}

impl ConnectionSubject {
    pub fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Self::Company(name) => ("company", name),
            Self::Founder(name) => ("founder", name),
            Self::Industry(name) => ("industry", name),
        }
    }
}

/// Upstream data-API client. GETs are retried on transient failures; writes
/// (settings save, crawl create) are single-shot.
#[derive(Debug, Clone)]
pub struct CrunchyApiClient {
    http: Client,
    base_url: String,
}

impl CrunchyApiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str) -> Result<Self, CrunchyApiError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("crunchy-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CrunchyApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list_companies(
        &self,
        query: &CompanyListQuery,
    ) -> Result<CompanyPage, CrunchyApiError> {
        let pairs = query
            .query_pairs()
            .map_err(|e| CrunchyApiError::Serde(e.to_string()))?;
        self.get_with_retry("/public/comp", &pairs).await
    }

    pub async fn list_industries(
        &self,
        selected: &[String],
        sort_by: IndustrySort,
    ) -> Result<Vec<IndustryCount>, CrunchyApiError> {
        let mut pairs: Vec<(&'static str, String)> = selected
            .iter()
            .map(|industry| ("selected[]", industry.clone()))
            .collect();
        pairs.push(("sortBy", sort_by.to_string()));
        self.get_with_retry("/public/industries", &pairs).await
    }

    pub async fn get_settings(&self) -> Result<IndustrySettings, CrunchyApiError> {
        self.get_with_retry("/public/settings", &[]).await
    }

    pub async fn save_settings(&self, industries: &[String]) -> Result<(), CrunchyApiError> {
        self.post_json(
            "/public/settings",
            &serde_json::json!({ "industry": industries }),
        )
        .await?;
        Ok(())
    }

    pub async fn pending_counts(&self) -> Result<PendingCounts, CrunchyApiError> {
        self.get_with_retry("/public/pending", &[]).await
    }

    pub async fn connection(
        &self,
        subject: &ConnectionSubject,
        key: ConnectionKey,
    ) -> Result<Value, CrunchyApiError> {
        let (name, value) = subject.query_pair();
        let pairs = [(name, value.to_string()), ("key", key.to_string())];
        self.get_with_retry("/public/connection", &pairs).await
    }

    /// Push URLs onto the crawl queue. The upstream fans the batch out into
    /// one queue message per URL.
    pub async fn create_crawl(&self, urls: &[String]) -> Result<(), CrunchyApiError> {
        self.post_json("/api/crawl/create", &serde_json::json!({ "url": urls }))
            .await?;
        Ok(())
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        pairs: &[(&'static str, String)],
    ) -> Result<T, CrunchyApiError> {
        (|| async {
            let res = self
                .http
                .get(format!("{}{path}", self.base_url))
                .query(pairs)
                .send()
                .await
                .map_err(map_reqwest_error)?;
            Self::read_json(res).await
        })
        .retry(
            &ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(250))
                .with_max_delay(Duration::from_secs(5))
                .with_max_times(3)
                .with_jitter(),
        )
        .when(|e: &CrunchyApiError| e.should_retry())
        .notify(|e, dur| {
            warn!(
                "Crunchy API call failed, retrying after {:.2}s: {}",
                dur.as_secs_f64(),
                e
            )
        })
        .await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, CrunchyApiError> {
        let res = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(res).await
    }

    async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, CrunchyApiError> {
        let status = res.status();
        if status.is_success() {
            res.json::<T>()
                .await
                .map_err(|e| CrunchyApiError::Serde(e.to_string()))
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(CrunchyApiError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> CrunchyApiError {
    if e.is_timeout() {
        CrunchyApiError::Timeout
    } else {
        CrunchyApiError::Transport(e.to_string())
    }
}
