//! Request handlers for the search endpoint

use super::AppState;
use crate::types::{QueryParams, DEFAULT_MAX_CONTENT, DEFAULT_MAX_RESULTS};
use crate::HarvestError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Query string of `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub max_results: Option<i64>,
    pub max_content: Option<i64>,
}

impl SearchRequest {
    /// Converts the request into query parameters, checking every bound
    pub fn into_params(self, timeout: Duration) -> Result<QueryParams, HarvestError> {
        let max_results = to_usize(self.max_results, DEFAULT_MAX_RESULTS);
        let max_content = to_usize(self.max_content, DEFAULT_MAX_CONTENT);

        let params = QueryParams::new(self.query.unwrap_or_default(), max_results, max_content)
            .with_timeout(timeout);
        params.validate()?;
        Ok(params)
    }
}

/// Negative values map to zero, which every bound rejects
fn to_usize(value: Option<i64>, default: usize) -> usize {
    value.map_or(default, |v| usize::try_from(v).unwrap_or(0))
}

/// Error responses, rendered as `{"detail": ...}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "No results found".to_string()),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<HarvestError> for ApiError {
    fn from(error: HarvestError) -> Self {
        match error {
            HarvestError::InvalidQuery(detail) => ApiError::BadRequest(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// `GET /search?query=&max_results=&max_content=`
pub async fn search(
    State(state): State<AppState>,
    request: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let timeout = Duration::from_millis(state.config.search.timeout_ms);
    let params = request.into_params(timeout)?;

    tracing::info!(
        query = %params.query,
        max_results = params.max_results,
        max_content = params.max_content,
        "Search request"
    );

    let results = crate::run_search(&params, &state.config).await?;
    if results.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(results).into_response())
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
