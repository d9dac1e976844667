//! Notion API client for page export and database retrieval.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::notion_export::PagePayload;

const NOTION_API_URL: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2021-08-16";

#[derive(Debug, Clone, Error)]
pub enum NotionApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api token")]
    InvalidToken,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api token: NOTION_CLIENT_SECRET environment variable not set")]
    MissingToken,
}

impl NotionApiError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Notion REST client. Database and page objects are passed through as
/// opaque JSON; only the page-creation body is typed.
#[derive(Debug, Clone)]
pub struct NotionApiClient {
    http: Client,
    token: String,
}

impl NotionApiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new client using the NOTION_CLIENT_SECRET environment variable
    pub fn from_env() -> Result<Self, NotionApiError> {
        let token =
            std::env::var("NOTION_CLIENT_SECRET").map_err(|_| NotionApiError::MissingToken)?;
        Self::new(token)
    }

    /// Create a new client with the given integration token
    pub fn new(token: String) -> Result<Self, NotionApiError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("crunchy-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotionApiError::Transport(e.to_string()))?;

        Ok(Self { http, token })
    }

    /// Create a page in a database. Not retried: a replayed create would
    /// duplicate the page.
    pub async fn create_page(&self, payload: &PagePayload) -> Result<Value, NotionApiError> {
        let res = self
            .http
            .post(format!("{NOTION_API_URL}/v1/pages"))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(res).await
    }

    pub async fn retrieve_database(&self, id: &str) -> Result<Value, NotionApiError> {
        self.get_with_retry(&format!("/v1/databases/{id}")).await
    }

    pub async fn list_databases(&self) -> Result<Value, NotionApiError> {
        self.get_with_retry("/v1/databases").await
    }

    pub async fn retrieve_page(&self, id: &str) -> Result<Value, NotionApiError> {
        self.get_with_retry(&format!("/v1/pages/{id}")).await
    }

    /// List the pages of a database via its query endpoint (empty filter).
    pub async fn query_database(&self, id: &str) -> Result<Value, NotionApiError> {
        let path = format!("/v1/databases/{id}/query");
        (|| async {
            let res = self
                .http
                .post(format!("{NOTION_API_URL}{path}"))
                .bearer_auth(&self.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(&serde_json::json!({}))
                .send()
                .await
                .map_err(map_reqwest_error)?;
            Self::read_json(res).await
        })
        .retry(&Self::retry_policy())
        .when(|e: &NotionApiError| e.should_retry())
        .notify(|e, dur| {
            warn!(
                "Notion API call failed, retrying after {:.2}s: {}",
                dur.as_secs_f64(),
                e
            )
        })
        .await
    }

    async fn get_with_retry(&self, path: &str) -> Result<Value, NotionApiError> {
        (|| async {
            let res = self
                .http
                .get(format!("{NOTION_API_URL}{path}"))
                .bearer_auth(&self.token)
                .header("Notion-Version", NOTION_VERSION)
                .send()
                .await
                .map_err(map_reqwest_error)?;
            Self::read_json(res).await
        })
        .retry(&Self::retry_policy())
        .when(|e: &NotionApiError| e.should_retry())
        .notify(|e, dur| {
            warn!(
                "Notion API call failed, retrying after {:.2}s: {}",
                dur.as_secs_f64(),
                e
            )
        })
        .await
    }

    fn retry_policy() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(15))
            .with_max_times(3)
            .with_jitter()
    }

    async fn read_json(res: reqwest::Response) -> Result<Value, NotionApiError> {
        match res.status() {
            s if s.is_success() => res
                .json::<Value>()
                .await
                .map_err(|e| NotionApiError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(NotionApiError::InvalidToken),
            StatusCode::TOO_MANY_REQUESTS => Err(NotionApiError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(NotionApiError::Http { status, body })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> NotionApiError {
    if e.is_timeout() {
        NotionApiError::Timeout
    } else {
        NotionApiError::Transport(e.to_string())
    }
}
