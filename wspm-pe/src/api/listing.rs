//! Plan list and dashboard endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::listing::{self, Dashboard, PlanSummary, StatusFilter};
use crate::AppState;

/// GET /api/plans query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    /// `all`, `draft`, `submitted`, `approved` or `rejected`
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub plans: Vec<PlanSummary>,
    pub total: usize,
}

/// GET /api/plans
pub async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let status: StatusFilter = query.status.parse()?;
    let plans = state.listing.filter(&query.search, status).await;

    Ok(Json(ListResponse {
        total: plans.len(),
        plans,
    }))
}

/// DELETE /api/plans/:id
///
/// Removes the entry from the list only.
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.listing.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("plan {} is not listed", id)))
    }
}

/// GET /api/dashboard
pub async fn get_dashboard() -> Json<Dashboard> {
    Json(listing::dashboard())
}

pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plans", get(list_plans))
        .route("/api/dashboard", get(get_dashboard))
}
