//! Routes for crawl submission and queue status.

use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use services::services::{crawl::CrawlService, crunchy_api::PendingCounts};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct CreateCrawlRequest {
    pub url: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct CrawlQueuedResponse {
    pub queued: usize,
}

/// POST /api/crawl
/// Validate a batch of URLs and push them onto the upstream crawl queue.
pub async fn create_crawl(
    State(state): State<AppState>,
    Json(payload): Json<CreateCrawlRequest>,
) -> Result<ResponseJson<ApiResponse<CrawlQueuedResponse>>, ApiError> {
    let queued = CrawlService::new(state.crunchy.clone())
        .submit(&payload.url)
        .await?;
    Ok(ResponseJson(ApiResponse::success(CrawlQueuedResponse {
        queued,
    })))
}

/// GET /api/pending
/// Crawl-queue depths per source, polled by the dashboard header.
pub async fn pending(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<PendingCounts>>, ApiError> {
    let counts = state.crunchy.pending_counts().await?;
    Ok(ResponseJson(ApiResponse::success(counts)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/crawl", post(create_crawl))
        .route("/pending", get(pending))
}
