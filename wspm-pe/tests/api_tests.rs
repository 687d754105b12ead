//! Integration tests for wspm-pe API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method
use wspm_common::store::{
    FixedIdGenerator, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
use wspm_common::PlanStore;
use wspm_pe::uploads::UploadTracker;
use wspm_pe::{build_router, AppState, SharedBackend};

/// Test helper: app over an in-memory store with a fixed id sequence
fn setup_app_with(backend: SharedBackend) -> axum::Router {
    let store = PlanStore::with_id_generator(
        backend,
        Arc::new(FixedIdGenerator::new("1700000000000")),
    );
    build_router(AppState::with_parts(store, UploadTracker::default()))
}

fn setup_app() -> axum::Router {
    setup_app_with(Arc::new(MemoryKeyValueStore::new()))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Send one request and return status plus JSON body (Null for empty bodies)
async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wspm-pe");
    assert!(body["version"].is_string());
    assert_eq!(body["open_drafts"], 0);
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/buildinfo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(!body["git_hash"].as_str().unwrap().is_empty());
    assert!(!body["build_timestamp"].as_str().unwrap().is_empty());
    assert!(!body["build_profile"].as_str().unwrap().is_empty());
}

// =============================================================================
// Editing
// =============================================================================

#[tokio::test]
async fn test_open_new_plan_allocates_id() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("POST", "/api/plans/new/edit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1700000000000");
    assert_eq!(body["origin"], "template");
    assert_eq!(body["dirty"], false);
    assert_eq!(body["plan"]["summary"], "");
    assert_eq!(body["plan"]["lifeHistory"], "");
    assert_eq!(body["plan"]["basicInfo"]["name"], "田中太郎");
    assert_eq!(body["plan"]["services"]["serviceType"], json!(["居宅介護"]));
}

#[tokio::test]
async fn test_edit_requires_open_draft() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/plans/42/fields",
            json!({"section": "", "field": "summary", "value": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_field_edits_and_unknown_field() {
    let app = setup_app();
    send(&app, test_request("GET", "/api/plans/7/edit")).await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/plans/7/fields",
            json!({"section": "basicInfo", "field": "name", "value": "佐藤花子"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["basicInfo"]["name"], "佐藤花子");
    assert_eq!(body["warnings"], json!([]));

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/plans/7/fields",
            json!({"section": "summary", "value": "初回面談"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["summary"], "初回面談");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/plans/7/fields",
            json!({"section": "basicInfo", "field": "nickname", "value": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_service_selection_and_metrics() {
    let app = setup_app();
    send(&app, test_request("GET", "/api/plans/8/edit")).await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/plans/8/services",
            json!({"label": "生活介護", "selected": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["plan"]["services"]["serviceType"],
        json!(["居宅介護", "生活介護"])
    );

    let (_, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/plans/8/metrics/frequency",
            json!({"label": "生活介護", "value": "03"}),
        ),
    )
    .await;
    assert_eq!(body["plan"]["services"]["frequencyMap"], json!({"生活介護": "3"}));

    // Metric for an unselected service: dropped with a warning
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/plans/8/metrics/duration",
            json!({"label": "短期入所", "value": "2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["services"]["durationMap"], json!({}));
    assert_eq!(body["warnings"][0]["code"], "METRIC_FOR_UNSELECTED_SERVICE");
    assert_eq!(body["warnings"][0]["label"], "短期入所");

    // Deselecting clears the service's metrics
    let (_, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/plans/8/services",
            json!({"label": "生活介護", "selected": false}),
        ),
    )
    .await;
    assert_eq!(body["plan"]["services"]["serviceType"], json!(["居宅介護"]));
    assert_eq!(body["plan"]["services"]["frequencyMap"], json!({}));
}

#[tokio::test]
async fn test_unknown_metric_kind_is_rejected() {
    let app = setup_app();
    send(&app, test_request("GET", "/api/plans/8/edit")).await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/plans/8/metrics/weight",
            json!({"label": "居宅介護", "value": "2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_and_view_round_trip() {
    let app = setup_app();
    let (_, body) = send(&app, test_request("POST", "/api/plans/new/edit")).await;
    let id = body["id"].as_str().unwrap().to_string();

    send(
        &app,
        json_request(
            "PUT",
            &format!("/api/plans/{}/metrics/frequency", id),
            json!({"label": "居宅介護", "value": "3"}),
        ),
    )
    .await;
    send(
        &app,
        json_request(
            "PUT",
            &format!("/api/plans/{}/metrics/duration", id),
            json!({"label": "居宅介護", "value": "2"}),
        ),
    )
    .await;

    let (status, body) = send(&app, test_request("POST", &format!("/api/plans/{}/save", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (_, draft) = send(&app, test_request("GET", &format!("/api/plans/{}/edit", id))).await;
    assert_eq!(draft["dirty"], false);
    assert_eq!(draft["origin"], "stored");

    let (status, view) = send(&app, test_request("GET", &format!("/api/plans/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["origin"], "stored");
    assert_eq!(view["servicesLine"], "居宅介護 週3 2時間");
    assert_eq!(view["plan"]["services"]["durationMap"], json!({"居宅介護": "2"}));
}

#[tokio::test]
async fn test_failed_save_keeps_draft() {
    let app = setup_app_with(Arc::new(MemoryKeyValueStore::with_quota(64)));
    send(&app, test_request("GET", "/api/plans/5/edit")).await;
    send(
        &app,
        json_request(
            "PATCH",
            "/api/plans/5/fields",
            json!({"section": "lifeHistory", "value": "生活歴"}),
        ),
    )
    .await;

    let (status, body) = send(&app, test_request("POST", "/api/plans/5/save")).await;
    assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
    assert_eq!(body["error"]["code"], "SAVE_FAILED");

    let (_, draft) = send(&app, test_request("GET", "/api/plans/5/edit")).await;
    assert_eq!(draft["dirty"], true);
    assert_eq!(draft["plan"]["lifeHistory"], "生活歴");

    // Nothing was stored
    let (_, view) = send(&app, test_request("GET", "/api/plans/5")).await;
    assert_eq!(view["origin"], "template");
}

#[tokio::test]
async fn test_discard_draft() {
    let app = setup_app();
    send(&app, test_request("GET", "/api/plans/3/edit")).await;

    let (status, _) = send(&app, test_request("DELETE", "/api/plans/3/edit")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, test_request("DELETE", "/api/plans/3/edit")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sqlite_backed_save() {
    let dir = TempDir::new().unwrap();
    let backend = SqliteKeyValueStore::open(&dir.path().join("wspm.db"))
        .await
        .unwrap();
    let app = setup_app_with(Arc::new(backend));

    send(&app, test_request("GET", "/api/plans/11/edit")).await;
    send(
        &app,
        json_request(
            "PATCH",
            "/api/plans/11/fields",
            json!({"section": "goals", "field": "shortTerm", "value": "外出の機会を増やす"}),
        ),
    )
    .await;
    let (status, _) = send(&app, test_request("POST", "/api/plans/11/save")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = send(&app, test_request("GET", "/api/plans/11")).await;
    assert_eq!(view["plan"]["goals"]["shortTerm"], "外出の機会を増やす");
}

// =============================================================================
// Viewing
// =============================================================================

#[tokio::test]
async fn test_template_view() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/template")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["origin"], "template");
    assert!(body.get("id").is_none());
    assert_eq!(body["servicesLine"], "居宅介護 週3 2時間");
    assert_eq!(body["plan"]["creator"], "山田相談員");
    assert_eq!(body["plan"]["createdAt"], "2024-01-15");
    assert_eq!(body["plan"]["summary"], "支援経過や課題の例文がここに入ります。");
    assert_eq!(body["plan"]["lifeHistory"], "生活歴の例文がここに入ります。");
}

#[tokio::test]
async fn test_view_unsaved_plan_shows_sample() {
    let app = setup_app();

    let (status, view) = send(&app, test_request("GET", "/api/plans/77")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["id"], "77");
    assert_eq!(view["origin"], "template");
    assert_eq!(view["plan"]["contact"], "03-1234-5678");

    // The editor still starts from the blank-text template
    let (_, draft) = send(&app, test_request("GET", "/api/plans/77/edit")).await;
    assert_eq!(draft["plan"]["summary"], "");
    assert_eq!(draft["plan"]["creator"], "");
}

#[tokio::test]
async fn test_unreadable_stored_plan() {
    let backend = Arc::new(MemoryKeyValueStore::new());
    backend.set("planData_13", "{oops").await.unwrap();
    let app = setup_app_with(backend);

    let (status, body) = send(&app, test_request("GET", "/api/plans/13")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "UNREADABLE_PLAN");
}

#[tokio::test]
async fn test_pdf_export_not_implemented() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/plans/1/pdf")).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
}

// =============================================================================
// Listing, dashboard and catalog
// =============================================================================

#[tokio::test]
async fn test_list_and_filter_plans() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/plans")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let (_, body) = send(&app, test_request("GET", "/api/plans?status=draft")).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["plans"][0]["clientName"], "佐藤花子");
    assert_eq!(body["plans"][0]["statusLabel"], "下書き");

    let (status, _) = send(&app, test_request("GET", "/api/plans?status=archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_from_listing() {
    let app = setup_app();

    let (status, _) = send(&app, test_request("DELETE", "/api/plans/1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, test_request("GET", "/api/plans")).await;
    assert_eq!(body["total"], 2);

    let (status, _) = send(&app, test_request("DELETE", "/api/plans/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalPlans"], 156);
    assert_eq!(body["stats"]["thisMonth"], 23);
    assert_eq!(body["recentPlans"][3]["name"], "高橋美咲");
}

#[tokio::test]
async fn test_catalog() {
    let app = setup_app();

    let (status, body) = send(&app, test_request("GET", "/api/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serviceTypes"].as_array().unwrap().len(), 8);
    assert_eq!(body["genders"][0], "男性");
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_submission() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/uploads",
            json!({"files": [
                {"name": "面談.mp3", "size": 2048},
                {"name": "memo.txt", "size": 10},
                {"name": "long.wav", "size": 200 * 1024 * 1024u64}
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["files"][0]["status"], "uploading");
    assert_eq!(body["files"][1]["status"], "error");
    assert_eq!(body["files"][2]["status"], "error");

    let (_, snapshot) = send(&app, test_request("GET", "/api/uploads")).await;
    assert_eq!(snapshot["total"], 3);
    assert_eq!(snapshot["processing"], false);

    let (status, _) = send(&app, json_request("POST", "/api/uploads", json!({"files": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_process_uploads_conflict() {
    let app = setup_app();

    let (status, _) = send(&app, test_request("POST", "/api/uploads/process")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(
        &app,
        json_request("POST", "/api/uploads", json!({"files": [{"name": "a.ogg", "size": 1}]})),
    )
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(3_100)).await;

    let (status, body) = send(&app, test_request("POST", "/api/uploads/process")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["files"], 1);

    let (status, body) = send(&app, test_request("POST", "/api/uploads/process")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}
