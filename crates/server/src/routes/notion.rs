//! Routes for Notion export and database browsing.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use services::services::notion_export::{CompanyExport, build_page_payload};
use tracing::info;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct ExportRequest {
    /// Target database; falls back to the configured default.
    pub database_id: Option<String>,
    #[serde(flatten)]
    #[ts(flatten)]
    pub company: CompanyExport,
}

/// POST /api/notion/export
/// Map a company record onto a Notion page and create it.
pub async fn export_company(
    State(state): State<AppState>,
    Json(payload): Json<ExportRequest>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let database_id = payload
        .database_id
        .filter(|id| !id.is_empty())
        .or_else(|| state.default_notion_database.clone())
        .unwrap_or_default();

    let page_payload = build_page_payload(&database_id, &payload.company)?;
    let page = state.notion.create_page(&page_payload).await?;

    info!(company = %payload.company.name, %database_id, "company exported to notion");
    Ok(ResponseJson(ApiResponse::success(page)))
}

/// GET /api/notion/databases
pub async fn list_databases(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let databases = state.notion.list_databases().await?;
    Ok(ResponseJson(ApiResponse::success(databases)))
}

/// GET /api/notion/databases/{database_id}
pub async fn retrieve_database(
    State(state): State<AppState>,
    Path(database_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let database = state.notion.retrieve_database(&database_id).await?;
    Ok(ResponseJson(ApiResponse::success(database)))
}

/// GET /api/notion/databases/{database_id}/pages
pub async fn query_database(
    State(state): State<AppState>,
    Path(database_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let pages = state.notion.query_database(&database_id).await?;
    Ok(ResponseJson(ApiResponse::success(pages)))
}

/// GET /api/notion/pages/{page_id}
pub async fn retrieve_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let page = state.notion.retrieve_page(&page_id).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/notion",
        Router::new()
            .route("/export", post(export_company))
            .route("/databases", get(list_databases))
            .route("/databases/{database_id}", get(retrieve_database))
            .route("/databases/{database_id}/pages", get(query_database))
            .route("/pages/{page_id}", get(retrieve_page)),
    )
}
