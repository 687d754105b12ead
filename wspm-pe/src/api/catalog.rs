//! Option lists for the plan editor's select fields

use axum::{routing::get, Json, Router};
use serde::Serialize;
use wspm_common::catalog;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub service_types: &'static [&'static str],
    pub genders: &'static [&'static str],
    pub disability_types: &'static [&'static str],
    pub support_levels: &'static [&'static str],
    pub education_levels: &'static [&'static str],
}

/// GET /api/catalog
pub async fn get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        service_types: &catalog::SERVICE_TYPES,
        genders: &catalog::GENDERS,
        disability_types: &catalog::DISABILITY_TYPES,
        support_levels: &catalog::SUPPORT_LEVELS,
        education_levels: &catalog::EDUCATION_LEVELS,
    })
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/api/catalog", get(get_catalog))
}
