//! Plan editing, saving and viewing

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wspm_common::plan::{
    format_services, set_field, set_service_metric, toggle_service_type, view_sample,
    EditOutcome, FieldPatch, MetricKind,
};
use wspm_common::store::NEW_PLAN_SENTINEL;
use wspm_common::{PlanOrigin, PlanRecord, ValidationWarning};

use crate::drafts::Draft;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Open draft as returned to the editor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub id: String,
    pub origin: PlanOrigin,
    pub dirty: bool,
    pub opened_at: DateTime<Utc>,
    pub plan: PlanRecord,
}

impl DraftResponse {
    fn new(id: String, draft: Draft) -> Self {
        Self {
            id,
            origin: draft.origin,
            dirty: draft.dirty,
            opened_at: draft.opened_at,
            plan: draft.record,
        }
    }
}

/// Non-fatal finding attached to an edit response
#[derive(Debug, Serialize)]
pub struct WarningDto {
    pub code: &'static str,
    pub label: String,
    pub message: String,
}

impl From<ValidationWarning> for WarningDto {
    fn from(warning: ValidationWarning) -> Self {
        let message = warning.to_string();
        let (code, label) = match warning {
            ValidationWarning::MetricForUnselectedService { label } => {
                ("METRIC_FOR_UNSELECTED_SERVICE", label)
            }
            ValidationWarning::UnknownServiceType { label } => ("UNKNOWN_SERVICE_TYPE", label),
        };
        Self {
            code,
            label,
            message,
        }
    }
}

/// Result of one edit
#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub id: String,
    pub plan: PlanRecord,
    pub warnings: Vec<WarningDto>,
}

impl EditResponse {
    fn new(id: String, outcome: EditOutcome) -> Self {
        Self {
            id,
            plan: outcome.record,
            warnings: outcome.warnings.into_iter().map(WarningDto::from).collect(),
        }
    }
}

/// PATCH /api/plans/:id/fields request
#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    /// Subsection name; empty for top-level fields
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub field: String,
    pub value: String,
}

/// PUT /api/plans/:id/services request
#[derive(Debug, Deserialize)]
pub struct ServiceSelection {
    pub label: String,
    pub selected: bool,
}

/// PUT /api/plans/:id/metrics/:kind request
#[derive(Debug, Deserialize)]
pub struct MetricInput {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub id: String,
    pub saved_at: DateTime<Utc>,
}

/// Read-only rendering of a plan
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub origin: PlanOrigin,
    /// Selected services with their metrics, e.g. `居宅介護 週3 2時間`
    pub services_line: String,
    pub plan: PlanRecord,
}

impl PlanView {
    fn new(id: Option<String>, origin: PlanOrigin, plan: PlanRecord) -> Self {
        Self {
            id,
            origin,
            services_line: format_services(&plan.services),
            plan,
        }
    }
}

/// GET|POST /api/plans/:id/edit
///
/// Opens a draft for `id`, or returns the one already open. The sentinel
/// `new` always opens a fresh plan under a newly allocated id.
pub async fn open_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DraftResponse>> {
    if id != NEW_PLAN_SENTINEL {
        if let Some(draft) = state.drafts.get(&id).await {
            return Ok(Json(DraftResponse::new(id, draft)));
        }
    }

    let loaded = state.store.load(&id).await?;
    let draft = state
        .drafts
        .open(&loaded.id, loaded.origin, loaded.record)
        .await;
    Ok(Json(DraftResponse::new(loaded.id, draft)))
}

/// DELETE /api/plans/:id/edit
///
/// Closes the draft without saving; storage is untouched.
pub async fn discard_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.drafts.discard(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(no_draft(&id))
    }
}

/// PATCH /api/plans/:id/fields
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FieldUpdate>,
) -> ApiResult<Json<EditResponse>> {
    let patch = FieldPatch::parse(&request.section, &request.field, request.value)?;

    let outcome = state
        .drafts
        .apply(&id, |record| EditOutcome {
            record: set_field(record, patch),
            warnings: Vec::new(),
        })
        .await
        .ok_or_else(|| no_draft(&id))?;
    Ok(Json(EditResponse::new(id, outcome)))
}

/// PUT /api/plans/:id/services
pub async fn select_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ServiceSelection>,
) -> ApiResult<Json<EditResponse>> {
    let outcome = state
        .drafts
        .apply(&id, |record| {
            toggle_service_type(record, &request.label, request.selected)
        })
        .await
        .ok_or_else(|| no_draft(&id))?;
    Ok(Json(EditResponse::new(id, outcome)))
}

/// PUT /api/plans/:id/metrics/:kind
pub async fn update_metric(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    Json(request): Json<MetricInput>,
) -> ApiResult<Json<EditResponse>> {
    let kind: MetricKind = kind.parse()?;

    let outcome = state
        .drafts
        .apply(&id, |record| {
            set_service_metric(record, kind, &request.label, &request.value)
        })
        .await
        .ok_or_else(|| no_draft(&id))?;
    Ok(Json(EditResponse::new(id, outcome)))
}

/// POST /api/plans/:id/save
///
/// Writes the draft to storage. On failure the draft stays open and
/// unchanged so the edits are not lost.
pub async fn save_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaveResponse>> {
    let draft = state.drafts.get(&id).await.ok_or_else(|| no_draft(&id))?;

    if let Err(e) = state.store.save(&id, &draft.record).await {
        warn!(plan_id = %id, "Save failed; draft kept open: {}", e);
        return Err(e.into());
    }

    state.drafts.mark_saved(&id, &draft.record).await;
    Ok(Json(SaveResponse {
        id,
        saved_at: Utc::now(),
    }))
}

/// GET /api/plans/:id
///
/// Stored plan, or the view sample when nothing is stored under `id`.
pub async fn view_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PlanView>> {
    if id == NEW_PLAN_SENTINEL {
        return Err(ApiError::BadRequest(
            "a plan must be saved before it can be viewed".to_string(),
        ));
    }

    let loaded = state.store.load(&id).await?;
    let plan = match loaded.origin {
        PlanOrigin::Stored => loaded.record,
        PlanOrigin::Template => view_sample(),
    };
    Ok(Json(PlanView::new(Some(loaded.id), loaded.origin, plan)))
}

/// GET /api/template
pub async fn view_template() -> Json<PlanView> {
    Json(PlanView::new(None, PlanOrigin::Template, view_sample()))
}

/// GET /api/plans/:id/pdf
pub async fn export_pdf(Path(id): Path<String>) -> ApiResult<Json<()>> {
    info!(plan_id = %id, "PDF export requested");
    Err(ApiError::NotImplemented("PDF export is not available yet".to_string()))
}

fn no_draft(id: &str) -> ApiError {
    ApiError::NotFound(format!("plan {} is not open for editing", id))
}

/// Build plan editing and viewing routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/plans/:id",
            get(view_plan).delete(super::listing::delete_plan),
        )
        .route(
            "/api/plans/:id/edit",
            get(open_draft).post(open_draft).delete(discard_draft),
        )
        .route("/api/plans/:id/fields", patch(update_field))
        .route("/api/plans/:id/services", put(select_service))
        .route("/api/plans/:id/metrics/:kind", put(update_metric))
        .route("/api/plans/:id/save", post(save_draft))
        .route("/api/plans/:id/pdf", get(export_pdf))
        .route("/api/template", get(view_template))
}
