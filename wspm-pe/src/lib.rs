//! wspm-pe library - Plan Editor service
//!
//! Holds open editing sessions for support plans and persists them through
//! the wspm-common plan store. Also serves the plan list, dashboard figures
//! and the simulated audio upload used by the web UI.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wspm_common::store::KeyValueStore;
use wspm_common::PlanStore;

pub mod api;
pub mod drafts;
pub mod error;
pub mod listing;
pub mod uploads;

pub use crate::error::{ApiError, ApiResult};

use drafts::DraftRegistry;
use listing::PlanListing;
use uploads::UploadTracker;

/// Key-value backend shared by every handler
pub type SharedBackend = Arc<dyn KeyValueStore>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PlanStore<SharedBackend>>,
    pub drafts: Arc<DraftRegistry>,
    pub listing: Arc<PlanListing>,
    pub uploads: UploadTracker,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State over `backend` with time-derived plan ids and default upload timing
    pub fn new(backend: SharedBackend) -> Self {
        Self::with_parts(PlanStore::new(backend), UploadTracker::default())
    }

    pub fn with_parts(store: PlanStore<SharedBackend>, uploads: UploadTracker) -> Self {
        Self {
            store: Arc::new(store),
            drafts: Arc::new(DraftRegistry::new()),
            listing: Arc::new(PlanListing::new()),
            uploads,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::plan_routes())
        .merge(api::listing_routes())
        .merge(api::upload_routes())
        .merge(api::catalog_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
