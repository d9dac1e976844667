//! Error-to-response mapping for all API routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use services::services::{
    crawl::CrawlError, crunchy_api::CrunchyApiError, notion_api::NotionApiError,
    notion_export::ExportError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Crunchy(#[from] CrunchyApiError),
    #[error(transparent)]
    Notion(#[from] NotionApiError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Crawl(#[from] CrawlError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Export(_) => StatusCode::BAD_REQUEST,
            Self::Crawl(CrawlError::Upstream(e)) => crunchy_status(e),
            Self::Crawl(_) => StatusCode::BAD_REQUEST,
            Self::Crunchy(e) => crunchy_status(e),
            Self::Notion(e) => notion_status(e),
        }
    }
}

fn crunchy_status(e: &CrunchyApiError) -> StatusCode {
    match e {
        CrunchyApiError::Http { status, .. } => passthrough_4xx(*status),
        CrunchyApiError::Transport(_) | CrunchyApiError::Timeout | CrunchyApiError::Serde(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn notion_status(e: &NotionApiError) -> StatusCode {
    match e {
        NotionApiError::Http { status, .. } => passthrough_4xx(*status),
        NotionApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        NotionApiError::InvalidToken | NotionApiError::MissingToken => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        NotionApiError::Transport(_) | NotionApiError::Timeout | NotionApiError::Serde(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// Upstream 4xx statuses are the caller's fault and pass through; anything
/// else surfaces as a bad gateway.
fn passthrough_4xx(status: u16) -> StatusCode {
    if (400..=499).contains(&status) {
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST)
    } else {
        StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::warn!("request rejected: {self}");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_is_bad_request() {
        let err = ApiError::Export(ExportError::EmptyDatabaseId);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_4xx_passes_through() {
        let err = ApiError::Crunchy(CrunchyApiError::Http {
            status: 404,
            body: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_5xx_is_bad_gateway() {
        let err = ApiError::Notion(NotionApiError::Http {
            status: 500,
            body: String::new(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_transport_failure_is_bad_gateway() {
        let err = ApiError::Crunchy(CrunchyApiError::Timeout);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
