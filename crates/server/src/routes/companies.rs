//! Routes for the company listing table.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::{Deserialize, de::DeserializeOwned};
use services::services::crunchy_api::{ColumnFilter, ColumnSort, CompanyListQuery, CompanyPage};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CompaniesQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    /// JSON-encoded `[{ id, value }]` column-filter state.
    pub filters: Option<String>,
    /// JSON-encoded `[{ id, desc }]` sort state.
    pub sorting: Option<String>,
}

/// GET /api/companies
/// Paginated, filterable, sortable company listing proxied to the upstream
/// data API.
pub async fn list_companies(
    State(state): State<AppState>,
    Query(params): Query<CompaniesQuery>,
) -> Result<ResponseJson<ApiResponse<CompanyPage>>, ApiError> {
    let filters: Vec<ColumnFilter> = decode_table_state(params.filters.as_deref(), "filters")?;
    let sorting: Vec<ColumnSort> = decode_table_state(params.sorting.as_deref(), "sorting")?;

    let query = CompanyListQuery {
        page: params.page,
        search: params.search.filter(|s| !s.is_empty() && s != "null"),
        filters,
        sorting,
    };
    let page = state.crunchy.list_companies(&query).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

// The table widget serializes its state as JSON strings and sends "null"
// when a panel was never touched.
fn decode_table_state<T: DeserializeOwned>(
    raw: Option<&str>,
    name: &str,
) -> Result<Vec<T>, ApiError> {
    match raw {
        None | Some("") | Some("null") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| ApiError::BadRequest(format!("invalid {name}: {e}"))),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/companies", get(list_companies))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table_state_absent_and_null() {
        let none: Vec<ColumnSort> = decode_table_state(None, "sorting").unwrap();
        assert!(none.is_empty());
        let null: Vec<ColumnSort> = decode_table_state(Some("null"), "sorting").unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn test_decode_table_state_filters() {
        let filters: Vec<ColumnFilter> =
            decode_table_state(Some(r#"[{"id":"name","value":"acme"}]"#), "filters").unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].id, "name");
    }

    #[test]
    fn test_decode_table_state_invalid_json() {
        let err = decode_table_state::<ColumnFilter>(Some("{oops"), "filters").unwrap_err();
        assert!(err.to_string().contains("invalid filters"));
    }
}
