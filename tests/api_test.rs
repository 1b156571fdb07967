use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use coursetrack::api::router;
use coursetrack::db::{self, repository};
use coursetrack::error::AppError;
use coursetrack::extraction::{ExtractionClient, ExtractionRequest, ExtractionResponse, ExtractionSource};
use coursetrack::state::AppState;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

struct CannedExtractor {
    body: Value,
}

#[async_trait]
impl ExtractionClient for CannedExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, AppError> {
        assert!(matches!(request.source, ExtractionSource::Text(_)));
        serde_json::from_value(self.body.clone())
            .map_err(|e| AppError::Extraction(e.to_string()))
    }
}

struct FailingExtractor;

#[async_trait]
impl ExtractionClient for FailingExtractor {
    async fn extract(&self, _request: &ExtractionRequest) -> Result<ExtractionResponse, AppError> {
        Err(AppError::Extraction("service unavailable".to_string()))
    }
}

fn syllabus() -> Value {
    json!({
        "status": "ok",
        "pdf_title": "CS 101 Fall",
        "default_year": 2025,
        "items": [
            { "title": "Quiz 1", "due_date_iso": "2025-11-19", "page": 1 },
            { "title": "Project proposal", "due_date_raw": "Nov 21", "page": 2 }
        ]
    })
}

async fn app_with(extractor: Arc<dyn ExtractionClient>) -> (Router, SqlitePool) {
    let pool = db::connect_in_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let state = AppState::load(pool.clone(), extractor).await.unwrap();
    (router(state), pool)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_extract_review_commit_flow() {
    let (app, pool) = app_with(Arc::new(CannedExtractor { body: syllabus() })).await;

    let (status, report) = send(
        &app,
        "POST",
        "/staging/extract/text",
        Some(json!({ "text": "Quiz 1 due Nov 19", "course": "CS 101" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["document_title"], "CS 101 Fall");
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["dated"], 2);

    let (status, draft) = send(
        &app,
        "PATCH",
        "/staging/drafts/1",
        Some(json!({ "title": "Project proposal v2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["title"], "Project proposal v2");
    assert_eq!(draft["type"], "Project");

    let (status, outcome) = send(&app, "POST", "/staging/commit?today=2025-11-17", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome, json!({ "committed_count": 2, "skipped_count": 0 }));

    let (_, staging) = send(&app, "GET", "/staging", None).await;
    assert_eq!(staging["drafts"], json!([]));

    let (status, day) = send(&app, "GET", "/calendar/day/2025-11-19?today=2025-11-17", None).await;
    assert_eq!(status, StatusCode::OK);
    let assignments = day["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["title"], "Quiz 1");
    assert_eq!(assignments[0]["course"], "CS 101");
    assert_eq!(assignments[0]["type"], "Quiz");
    assert_eq!(assignments[0]["priority"], "medium");
    assert_eq!(assignments[0]["bucket"], "withinWindow");

    // same assignment seen on its due day
    let (_, day) = send(&app, "GET", "/calendar/day/2025-11-19?today=2025-11-19", None).await;
    assert_eq!(day["assignments"][0]["priority"], "high");
    assert_eq!(day["assignments"][0]["bucket"], "dueToday");

    let (_, courses) = send(&app, "GET", "/courses?today=2025-11-17", None).await;
    let courses = courses.as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["display_name"], "CS 101");
    assert_eq!(courses[0]["total_count"], 2);
    assert_eq!(courses[0]["upcoming_count"], 2);

    let stored = repository::load_state(&pool).await.unwrap();
    assert_eq!(stored.assignments.len(), 2);
    assert!(stored.assignments.iter().any(|a| a.title == "Project proposal v2"));
}

#[tokio::test]
async fn test_failed_extraction_keeps_current_drafts() {
    let (app, _pool) = app_with(Arc::new(FailingExtractor)).await;

    let (status, draft) = send(
        &app,
        "POST",
        "/staging/drafts",
        Some(json!({ "title": "Reading ch. 3", "due_date_text": "2025-11-20" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(draft["source"], "manual");

    let (status, err) = send(
        &app,
        "POST",
        "/staging/extract/text",
        Some(json!({ "text": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(err["message"], "service unavailable");

    let (_, staging) = send(&app, "GET", "/staging", None).await;
    assert_eq!(staging["summary"]["total"], 1);
    assert_eq!(staging["drafts"][0]["title"], "Reading ch. 3");
}

#[tokio::test]
async fn test_empty_commit_and_selection() {
    let (app, pool) = app_with(Arc::new(CannedExtractor { body: syllabus() })).await;

    let (_, outcome) = send(&app, "POST", "/staging/commit", None).await;
    assert_eq!(outcome, json!({ "committed_count": 0, "skipped_count": 0 }));

    send(&app, "POST", "/staging/extract/text", Some(json!({ "text": "x" }))).await;

    let (status, toggled) = send(&app, "POST", "/staging/drafts/0/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled, json!({ "staging_id": 0, "selected": false }));

    let (_, view) = send(&app, "POST", "/staging/select", Some(json!({ "selected": false }))).await;
    assert_eq!(view["summary"]["selected"], 0);

    let (_, outcome) = send(&app, "POST", "/staging/commit?today=2025-11-17", None).await;
    assert_eq!(outcome["committed_count"], 0);
    assert!(repository::load_state(&pool).await.unwrap().assignments.is_empty());

    let (_, assignments) = send(&app, "GET", "/assignments", None).await;
    assert_eq!(assignments, json!([]));
}

#[tokio::test]
async fn test_unknown_draft_and_bad_dates() {
    let (app, _pool) = app_with(Arc::new(FailingExtractor)).await;

    let (status, _) = send(&app, "PATCH", "/staging/drafts/9", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/staging/drafts/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/calendar/day/someday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/calendar/month/2025/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/assignments?today=2025-02-30", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/assignments",
        Some(json!({ "title": "HW", "due_date": "whenever" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assignment_crud_and_calendar_views() {
    let (app, pool) = app_with(Arc::new(FailingExtractor)).await;

    let (status, created) = send(
        &app,
        "POST",
        "/assignments?today=2025-11-19",
        Some(json!({ "title": "Lab 4", "course": "CHEM 110", "due_date": "11/19/2025", "type": "assignment" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["due_date"], "2025-11-19");
    assert_eq!(created["priority"], "high");
    let id = created["id"].as_str().unwrap().to_string();

    let (_, week) = send(&app, "GET", "/calendar/week/2025-11-19", None).await;
    assert_eq!(week["start"], "2025-11-16");
    assert_eq!(week["end"], "2025-11-22");
    assert_eq!(week["days"].as_array().unwrap().len(), 7);
    assert_eq!(week["days"][3]["assignments"][0]["id"], id.as_str());

    let (_, month) = send(&app, "GET", "/calendar/month/2025/11?today=2025-11-19", None).await;
    let cells = month["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 42);
    let today = cells.iter().find(|c| c["date"] == "2025-11-19").unwrap();
    assert_eq!(today["is_today"], true);
    assert_eq!(today["assignment_count"], 1);

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/assignments/{}?today=2025-11-19", id),
        Some(json!({ "completed": true, "due_date": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["due_date"], Value::Null);
    assert_eq!(updated["bucket"], "noDate");

    let (status, _) = send(&app, "DELETE", &format!("/assignments/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/assignments/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(repository::load_state(&pool).await.unwrap().assignments.is_empty());
}

#[tokio::test]
async fn test_course_folders_and_rename() {
    let (app, _pool) = app_with(Arc::new(FailingExtractor)).await;

    let (status, folder) = send(&app, "POST", "/courses", Some(json!({ "name": "Bio 110" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(folder["color"], "blue");

    let (status, _) = send(&app, "POST", "/courses", Some(json!({ "name": "bio 110" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(
        &app,
        "POST",
        "/assignments",
        Some(json!({ "title": "Lab", "course": "BIO 110" })),
    )
    .await;

    let (status, outcome) = send(
        &app,
        "POST",
        "/courses/rename",
        Some(json!({ "old_name": "bio 110", "new_name": "Biology 110" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["renamed_assignments"], 1);
    assert_eq!(outcome["folder_renamed"], true);

    let (_, courses) = send(&app, "GET", "/courses", None).await;
    assert_eq!(courses.as_array().unwrap().len(), 1);
    assert_eq!(courses[0]["display_name"], "Biology 110");

    let (status, _) = send(
        &app,
        "POST",
        "/courses/rename",
        Some(json!({ "old_name": "Physics", "new_name": "Phys" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = folder["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/courses/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_failed_save_leaves_state_unchanged() {
    let (app, pool) = app_with(Arc::new(CannedExtractor { body: syllabus() })).await;

    let (status, kept) = send(&app, "POST", "/assignments", Some(json!({ "title": "Kept" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let kept_id = kept["id"].as_str().unwrap().to_string();
    send(&app, "POST", "/staging/extract/text", Some(json!({ "text": "x" }))).await;

    sqlx::query("DROP TABLE course_folders").execute(&pool).await.unwrap();

    let (status, _) = send(&app, "POST", "/assignments", Some(json!({ "title": "Lost" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/assignments/{}", kept_id),
        Some(json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = send(&app, "DELETE", &format!("/assignments/{}", kept_id), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, assignments) = send(&app, "GET", "/assignments", None).await;
    let assignments = assignments.as_array().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["title"], "Kept");

    // a commit that cannot be saved keeps the drafts for another try
    let (status, _) = send(&app, "POST", "/staging/commit?today=2025-11-17", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (_, staging) = send(&app, "GET", "/staging", None).await;
    assert_eq!(staging["summary"]["total"], 2);

    let (status, _) = send(&app, "POST", "/courses", Some(json!({ "name": "Bio" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (_, courses) = send(&app, "GET", "/courses", None).await;
    assert_eq!(courses.as_array().unwrap().len(), 1);
    assert_eq!(courses[0]["display_name"], "");
}
