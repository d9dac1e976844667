//! Routes for knowledge-graph connection lookups.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use services::services::crunchy_api::{ConnectionKey, ConnectionSubject};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ConnectionQuery {
    /// What to return: connected companies, founders, or industries.
    pub key: ConnectionKey,
    pub company: Option<String>,
    pub founder: Option<String>,
    pub industry: Option<String>,
}

/// GET /api/connection
/// Exactly one of `company`, `founder`, `industry` names the starting entity.
pub async fn connection(
    State(state): State<AppState>,
    Query(params): Query<ConnectionQuery>,
) -> Result<ResponseJson<ApiResponse<Value>>, ApiError> {
    let subject = resolve_subject(params.company, params.founder, params.industry)?;
    let result = state.crunchy.connection(&subject, params.key).await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

fn resolve_subject(
    company: Option<String>,
    founder: Option<String>,
    industry: Option<String>,
) -> Result<ConnectionSubject, ApiError> {
    match (company, founder, industry) {
        (Some(name), None, None) => Ok(ConnectionSubject::Company(name)),
        (None, Some(name), None) => Ok(ConnectionSubject::Founder(name)),
        (None, None, Some(name)) => Ok(ConnectionSubject::Industry(name)),
        _ => Err(ApiError::BadRequest("no search query".to_string())),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/connection", get(connection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_subject_single_entity() {
        let subject = resolve_subject(None, Some("Jo".to_string()), None).unwrap();
        assert_eq!(subject, ConnectionSubject::Founder("Jo".to_string()));
    }

    #[test]
    fn test_resolve_subject_none_given() {
        let err = resolve_subject(None, None, None).unwrap_err();
        assert!(err.to_string().contains("no search query"));
    }

    #[test]
    fn test_resolve_subject_ambiguous() {
        assert!(
            resolve_subject(Some("Acme".to_string()), None, Some("saas".to_string())).is_err()
        );
    }
}
