use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query};
use axum::routing::{delete, patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::{
    Bucket, WINDOW_DAYS, build_month_grid, classify, compute_week_bounds, day_bucket, normalize_date,
};
use crate::db::repository;
use crate::error::AppError;
use crate::extraction::{ExtractionRequest, ExtractionSource};
use crate::models::{
    Assignment, AssignmentPatch, AssignmentType, CommitOutcome, CourseFolder, CourseSummary, Draft,
    DraftInput, DraftPatch, NewAssignment, NewCourseFolder, StagingSummary,
};
use crate::services::{ImportReport, ImportService};
use crate::state::AppState;
use crate::store::{RenameOutcome, Tracker};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assignments", get(list_assignments).post(create_assignment))
        .route("/assignments/overdue", get(list_overdue))
        .route("/assignments/upcoming", get(list_upcoming))
        .route("/assignments/{id}", patch(update_assignment).delete(delete_assignment))
        .route("/calendar/day/{date}", get(day_view))
        .route("/calendar/week/{date}", get(week_view))
        .route("/calendar/month/{year}/{month}", get(month_view))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/rename", post(rename_course))
        .route("/courses/{id}", delete(delete_course))
        .route("/staging", get(get_staging).delete(discard_staging))
        .route("/staging/extract/text", post(extract_text))
        .route("/staging/extract/document", post(extract_document))
        .route("/staging/drafts", post(add_draft))
        .route("/staging/drafts/{staging_id}", patch(edit_draft).delete(remove_draft))
        .route("/staging/drafts/{staging_id}/toggle", post(toggle_draft))
        .route("/staging/select", post(select_all_drafts))
        .route("/staging/commit", post(commit_staging))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ---- request / response shapes ----

#[derive(Deserialize)]
struct TodayQuery {
    today: Option<String>,
}

#[derive(Deserialize)]
struct CourseFilter {
    course: Option<String>,
}

#[derive(Deserialize)]
struct UpcomingParams {
    days: Option<u64>,
}

#[derive(Deserialize)]
struct CreateAssignmentRequest {
    title: String,
    #[serde(default)]
    course: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// A present-but-empty `due_date` or `description` clears it.
#[derive(Deserialize)]
struct UpdateAssignmentRequest {
    title: Option<String>,
    course: Option<String>,
    due_date: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
}

#[derive(Deserialize)]
struct RenameCourseRequest {
    old_name: String,
    new_name: String,
}

#[derive(Deserialize)]
struct TextExtractionRequest {
    text: String,
    #[serde(default)]
    repair: bool,
    #[serde(default)]
    course: Option<String>,
}

#[derive(Deserialize)]
struct DocumentExtractionParams {
    #[serde(default)]
    repair: bool,
    #[serde(default)]
    course: Option<String>,
}

#[derive(Deserialize)]
struct SelectAllRequest {
    selected: bool,
}

#[derive(Serialize)]
struct AssignmentView {
    #[serde(flatten)]
    assignment: Assignment,
    bucket: Bucket,
}

#[derive(Serialize)]
struct DayView {
    date: NaiveDate,
    assignments: Vec<AssignmentView>,
}

#[derive(Serialize)]
struct WeekView {
    start: NaiveDate,
    end: NaiveDate,
    days: Vec<DayView>,
}

#[derive(Serialize)]
struct MonthCellView {
    date: Option<NaiveDate>,
    is_today: bool,
    assignment_count: usize,
}

#[derive(Serialize)]
struct MonthView {
    year: i32,
    month: u32,
    cells: Vec<MonthCellView>,
}

#[derive(Serialize)]
struct StagingView {
    summary: StagingSummary,
    drafts: Vec<Draft>,
}

#[derive(Serialize)]
struct ToggleResponse {
    staging_id: usize,
    selected: bool,
}

// ---- helpers ----

fn resolve_today(query: &TodayQuery) -> Result<NaiveDate, AppError> {
    match query.today.as_deref() {
        Some(text) => normalize_date(text)
            .ok_or_else(|| AppError::BadRequest(format!("invalid today: {}", text))),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_path_date(text: &str) -> Result<NaiveDate, AppError> {
    normalize_date(text).ok_or_else(|| AppError::BadRequest(format!("invalid date: {}", text)))
}

/// `None` when the text is blank; an error when it is present but unreadable.
fn parse_due_text(text: &str) -> Result<Option<NaiveDate>, AppError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    normalize_date(text)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("unrecognised due date: {}", text)))
}

/// Priority is derived, so every outgoing assignment is reclassified
/// against the request's notion of today.
fn view(assignment: &Assignment, today: NaiveDate) -> AssignmentView {
    let classification = classify(assignment.due_date, today);
    let mut assignment = assignment.clone();
    assignment.priority = classification.priority;
    AssignmentView {
        assignment,
        bucket: classification.bucket,
    }
}

fn views<'a, I>(assignments: I, today: NaiveDate) -> Vec<AssignmentView>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    assignments.into_iter().map(|a| view(a, today)).collect()
}

/// Save `next` and only then make it the live tracker. On a failed save the
/// live tracker keeps its previous contents.
async fn persist(state: &AppState, live: &mut Tracker, next: Tracker) -> Result<(), AppError> {
    repository::save_state(&state.db, &next.state()).await?;
    *live = next;
    Ok(())
}

fn staging_view(tracker: &Tracker) -> StagingView {
    StagingView {
        summary: tracker.staging.summary(),
        drafts: tracker.staging.drafts().to_vec(),
    }
}

// ---- handlers ----

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_assignments(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<Vec<AssignmentView>>, AppError> {
    let today = resolve_today(&day)?;
    let tracker = state.tracker.lock().await;
    let out = match filter.course.as_deref() {
        Some(course) => views(tracker.assignments.by_course_key(course), today),
        None => views(tracker.assignments.all(), today),
    };
    Ok(Json(out))
}

async fn create_assignment(
    State(state): State<AppState>,
    Query(day): Query<TodayQuery>,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentView>), AppError> {
    let today = resolve_today(&day)?;
    let due_date = match req.due_date.as_deref() {
        Some(text) => parse_due_text(text)?,
        None => None,
    };
    let new = NewAssignment {
        title: req.title,
        course: req.course.unwrap_or_default(),
        due_date,
        kind: req
            .kind
            .as_deref()
            .map(AssignmentType::from_label)
            .unwrap_or_default(),
        description: req.description,
    };

    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    let created = next.assignments.create(new, today).clone();
    persist(&state, &mut tracker, next).await?;
    Ok((StatusCode::CREATED, Json(view(&created, today))))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(day): Query<TodayQuery>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> Result<Json<AssignmentView>, AppError> {
    let today = resolve_today(&day)?;
    let patch = AssignmentPatch {
        title: req.title,
        course: req.course,
        due_date: match req.due_date.as_deref() {
            Some(text) => Some(parse_due_text(text)?),
            None => None,
        },
        kind: req.kind.as_deref().map(AssignmentType::from_label),
        description: req
            .description
            .map(|d| Some(d).filter(|d| !d.trim().is_empty())),
        completed: req.completed,
    };

    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    let updated = next
        .assignments
        .update_by_id(&id, patch, Some(today))
        .cloned()
        .ok_or(AppError::NotFound)?;
    persist(&state, &mut tracker, next).await?;
    Ok(Json(view(&updated, today)))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    if !next.assignments.delete_by_id(&id) {
        return Err(AppError::NotFound);
    }
    persist(&state, &mut tracker, next).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_overdue(
    State(state): State<AppState>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<Vec<AssignmentView>>, AppError> {
    let today = resolve_today(&day)?;
    let tracker = state.tracker.lock().await;
    Ok(Json(views(tracker.assignments.overdue(today), today)))
}

async fn list_upcoming(
    State(state): State<AppState>,
    Query(params): Query<UpcomingParams>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<Vec<AssignmentView>>, AppError> {
    let today = resolve_today(&day)?;
    let days = params.days.unwrap_or(WINDOW_DAYS);
    let tracker = state.tracker.lock().await;
    Ok(Json(views(tracker.assignments.upcoming(today, days), today)))
}

async fn day_view(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<DayView>, AppError> {
    let today = resolve_today(&day)?;
    let date = parse_path_date(&date)?;
    let tracker = state.tracker.lock().await;
    Ok(Json(DayView {
        date,
        assignments: views(day_bucket(date, tracker.assignments.all()), today),
    }))
}

async fn week_view(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<WeekView>, AppError> {
    let today = resolve_today(&day)?;
    let bounds = compute_week_bounds(parse_path_date(&date)?);
    let tracker = state.tracker.lock().await;
    let all = tracker.assignments.all();
    let days = bounds
        .days()
        .map(|date| DayView {
            date,
            assignments: views(day_bucket(date, all), today),
        })
        .collect();
    Ok(Json(WeekView {
        start: bounds.start,
        end: bounds.end,
        days,
    }))
}

async fn month_view(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<MonthView>, AppError> {
    let today = resolve_today(&day)?;
    let grid = build_month_grid(year, month)
        .ok_or_else(|| AppError::BadRequest(format!("invalid month: {}-{}", year, month)))?
        .mark_today(today);
    let tracker = state.tracker.lock().await;
    let all = tracker.assignments.all();
    let cells = grid
        .cells
        .iter()
        .map(|cell| MonthCellView {
            date: cell.date,
            is_today: cell.is_today,
            assignment_count: cell.date.map_or(0, |d| day_bucket(d, all).len()),
        })
        .collect();
    Ok(Json(MonthView {
        year: grid.year,
        month: grid.month,
        cells,
    }))
}

async fn list_courses(
    State(state): State<AppState>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    let today = resolve_today(&day)?;
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.course_summaries(today)))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseFolder>,
) -> Result<(StatusCode, Json<CourseFolder>), AppError> {
    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    let folder = next.courses.add_folder(req)?;
    persist(&state, &mut tracker, next).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    next.courses.remove_folder(&id)?;
    persist(&state, &mut tracker, next).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn rename_course(
    State(state): State<AppState>,
    Json(req): Json<RenameCourseRequest>,
) -> Result<Json<RenameOutcome>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    let outcome = next.rename_course(&req.old_name, &req.new_name)?;
    persist(&state, &mut tracker, next).await?;
    Ok(Json(outcome))
}

async fn get_staging(State(state): State<AppState>) -> Result<Json<StagingView>, AppError> {
    let tracker = state.tracker.lock().await;
    Ok(Json(staging_view(&tracker)))
}

async fn extract_text(
    State(state): State<AppState>,
    Json(req): Json<TextExtractionRequest>,
) -> Result<Json<ImportReport>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }
    let service = ImportService::new(state.tracker.clone(), state.extractor.clone());
    let report = service
        .import(ExtractionRequest {
            source: ExtractionSource::Text(req.text),
            repair: req.repair,
            course_hint: req.course,
        })
        .await?;
    Ok(Json(report))
}

async fn extract_document(
    State(state): State<AppState>,
    Query(params): Query<DocumentExtractionParams>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, AppError> {
    let mut document = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid upload: {}", e)))?;
        document = Some((file_name, content_type, bytes.to_vec()));
    }

    let (file_name, content_type, bytes) =
        document.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;
    let mime_type = document_mime(&file_name, content_type.as_deref()).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unsupported file type: {}",
            content_type.as_deref().unwrap_or(&file_name)
        ))
    })?;

    let service = ImportService::new(state.tracker.clone(), state.extractor.clone());
    let report = service
        .import(ExtractionRequest {
            source: ExtractionSource::Document {
                file_name,
                mime_type,
                bytes,
            },
            repair: params.repair,
            course_hint: params.course,
        })
        .await?;
    Ok(Json(report))
}

/// PDFs and common image formats. Browsers are unreliable about content
/// types, so the file extension is checked as well.
fn document_mime(file_name: &str, content_type: Option<&str>) -> Option<String> {
    const PDF: [&str; 3] = ["application/pdf", "application/x-pdf", "binary/octet-stream"];
    const IMAGES: [&str; 6] = ["image/png", "image/jpeg", "image/jpg", "image/tiff", "image/bmp", "image/webp"];

    let name = file_name.to_lowercase();
    if let Some(ct) = content_type {
        if IMAGES.contains(&ct) {
            return Some(ct.to_string());
        }
        if PDF.contains(&ct) && (ct != "binary/octet-stream" || name.ends_with(".pdf")) {
            return Some("application/pdf".to_string());
        }
    }

    let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
    match ext {
        "pdf" => Some("application/pdf".to_string()),
        "png" => Some("image/png".to_string()),
        "jpg" | "jpeg" => Some("image/jpeg".to_string()),
        "tif" | "tiff" => Some("image/tiff".to_string()),
        "bmp" => Some("image/bmp".to_string()),
        "webp" => Some("image/webp".to_string()),
        _ => None,
    }
}

async fn add_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftInput>,
) -> Result<(StatusCode, Json<Draft>), AppError> {
    let mut tracker = state.tracker.lock().await;
    let draft = tracker.staging.add_manual(req).clone();
    Ok((StatusCode::CREATED, Json(draft)))
}

async fn edit_draft(
    State(state): State<AppState>,
    Path(staging_id): Path<usize>,
    Json(req): Json<DraftPatch>,
) -> Result<Json<Draft>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let draft = tracker.staging.edit_field(staging_id, req)?.clone();
    Ok(Json(draft))
}

async fn remove_draft(
    State(state): State<AppState>,
    Path(staging_id): Path<usize>,
) -> Result<StatusCode, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.staging.remove(staging_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_draft(
    State(state): State<AppState>,
    Path(staging_id): Path<usize>,
) -> Result<Json<ToggleResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let selected = tracker.staging.toggle_selected(staging_id)?;
    Ok(Json(ToggleResponse { staging_id, selected }))
}

async fn select_all_drafts(
    State(state): State<AppState>,
    Json(req): Json<SelectAllRequest>,
) -> Result<Json<StagingView>, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.staging.set_all_selected(req.selected);
    Ok(Json(staging_view(&tracker)))
}

async fn commit_staging(
    State(state): State<AppState>,
    Query(day): Query<TodayQuery>,
) -> Result<Json<CommitOutcome>, AppError> {
    let today = resolve_today(&day)?;
    let mut tracker = state.tracker.lock().await;
    let mut next = tracker.clone();
    let outcome = next.commit_staging(today);
    if outcome.committed_count > 0 {
        persist(&state, &mut tracker, next).await?;
    } else {
        *tracker = next;
    }
    tracing::info!(
        "committed {} drafts, skipped {}",
        outcome.committed_count,
        outcome.skipped_count
    );
    Ok(Json(outcome))
}

async fn discard_staging(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut tracker = state.tracker.lock().await;
    tracker.staging.discard_all();
    Ok(StatusCode::NO_CONTENT)
}
