//! Routes for industry aggregation (filter dropdown options).

use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use axum_extra::extract::Query;
use serde::Deserialize;
use services::services::crunchy_api::{IndustryCount, IndustrySort};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct IndustriesQuery {
    /// Industries already selected in the dropdown; narrows the aggregation.
    /// Axios serializes arrays with bracketed keys, so both spellings arrive.
    #[serde(default, alias = "selected[]")]
    pub selected: Vec<String>,
    #[serde(default, rename = "sortBy")]
    pub sort_by: IndustrySort,
}

/// GET /api/industries
pub async fn list_industries(
    State(state): State<AppState>,
    Query(params): Query<IndustriesQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<IndustryCount>>>, ApiError> {
    let industries = state
        .crunchy
        .list_industries(&params.selected, params.sort_by)
        .await?;
    Ok(ResponseJson(ApiResponse::success(industries)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/industries", get(list_industries))
}
