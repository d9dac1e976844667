//! Routes for industry-preference settings.

use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use services::services::crunchy_api::IndustrySettings;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct SaveSettingsRequest {
    pub industry: Vec<String>,
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<IndustrySettings>>, ApiError> {
    let settings = state.crunchy.get_settings().await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

/// POST /api/settings
/// Replace the interested-industries selection.
pub async fn save_settings(
    State(state): State<AppState>,
    Json(payload): Json<SaveSettingsRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.crunchy.save_settings(&payload.industry).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).post(save_settings))
}
