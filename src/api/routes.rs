use crate::config::Config;
use crate::db::{Database, DayUpdate, ImportSummary, NewTracker, TrackerSummary};
use crate::tracker::parser::{parse_checklist_text, parse_plan};
use crate::tracker::stats::TrackerStats;
use crate::tracker::{
    ChecklistItem, Day, DayStatus, Milestone, Mood, Tracker, validate_daily_hours,
    validate_day_number, validate_hours_logged, validate_slug, validate_total_days,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/trackers", get(tracker_list).post(tracker_create))
        .route(
            "/api/v1/trackers/:slug",
            get(tracker_get).delete(tracker_delete),
        )
        .route("/api/v1/trackers/:slug/stats", get(tracker_stats))
        .route("/api/v1/trackers/:slug/import", post(tracker_import))
        .route("/api/v1/trackers/:slug/days", post(day_create))
        .route(
            "/api/v1/trackers/:slug/days/:day",
            put(day_update).delete(day_delete),
        )
        .route(
            "/api/v1/trackers/:slug/days/:day/checklist/:index/toggle",
            post(checklist_toggle),
        )
        .route("/api/v1/trackers/:slug/milestones", post(milestone_create))
        .route(
            "/api/v1/trackers/:slug/milestones/:index",
            delete(milestone_delete),
        )
        .route(
            "/api/v1/trackers/:slug/milestones/:index/toggle",
            post(milestone_toggle),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusPayload {
    db_path: String,
    tracker_count: u32,
    api_port: u16,
}

#[derive(Debug, Serialize)]
struct TrackersPayload {
    trackers: Vec<TrackerSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTrackerPayload {
    slug: String,
    title: String,
    #[serde(default)]
    description: String,
    start_date: Option<NaiveDate>,
    total_days: Option<u32>,
    daily_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportPayload {
    bulk_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDayPayload {
    day_number: u32,
    #[serde(default)]
    title: String,
    checklist_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDayPayload {
    title: Option<String>,
    status: Option<DayStatus>,
    hours_logged: Option<f64>,
    notes: Option<String>,
    mood: Option<Mood>,
    checklist_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMilestonePayload {
    title: String,
    day_number: u32,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let database = Database::open(&state.config.db_path)?;

    Ok(Json(StatusPayload {
        db_path: state.config.db_path.display().to_string(),
        tracker_count: database.tracker_count()?,
        api_port: state.config.api_port,
    }))
}

async fn tracker_list(State(state): State<ApiState>) -> ApiResult<Json<TrackersPayload>> {
    let database = Database::open(&state.config.db_path)?;

    Ok(Json(TrackersPayload {
        trackers: database.list_trackers()?,
    }))
}

async fn tracker_create(
    State(state): State<ApiState>,
    Json(payload): Json<CreateTrackerPayload>,
) -> ApiResult<(StatusCode, Json<Tracker>)> {
    let slug = payload.slug.trim().to_string();
    validate_slug(&slug).map_err(ApiError::bad_request)?;

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }

    let total_days = payload
        .total_days
        .unwrap_or(state.config.default_total_days);
    validate_total_days(total_days).map_err(ApiError::bad_request)?;
    let daily_hours = payload
        .daily_hours
        .unwrap_or(state.config.default_daily_hours);
    validate_daily_hours(daily_hours).map_err(ApiError::bad_request)?;

    let database = Database::open(&state.config.db_path)?;
    let created = database.create_tracker(&NewTracker {
        slug: slug.clone(),
        title,
        description: payload.description,
        start_date: payload.start_date,
        total_days,
        daily_hours,
    })?;

    if !created {
        return Err(ApiError::Conflict(format!("Tracker already exists: {slug}")));
    }

    info!(slug = %slug, "tracker created");
    let tracker = load_tracker(&database, &slug)?;
    Ok((StatusCode::CREATED, Json(tracker)))
}

async fn tracker_get(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Tracker>> {
    let database = Database::open(&state.config.db_path)?;
    Ok(Json(load_tracker(&database, &slug)?))
}

async fn tracker_delete(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let database = Database::open(&state.config.db_path)?;
    if !database.delete_tracker(&slug)? {
        return Err(ApiError::NotFound(format!("Tracker not found: {slug}")));
    }

    info!(slug = %slug, "tracker deleted");
    Ok(Json(json!({ "deleted": true, "slug": slug })))
}

async fn tracker_stats(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<TrackerStats>> {
    let database = Database::open(&state.config.db_path)?;
    let tracker = load_tracker(&database, &slug)?;

    Ok(Json(tracker.stats()))
}

async fn tracker_import(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(payload): Json<ImportPayload>,
) -> ApiResult<Json<ImportSummary>> {
    let mut database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    let plan = parse_plan(&payload.bulk_text);
    if plan.is_empty() {
        info!(slug = %slug, "bulk import found no day headers");
        return Ok(Json(ImportSummary::default()));
    }

    let summary = database.import_plan(tracker_id, &plan)?;
    info!(
        slug = %slug,
        parsed = summary.parsed,
        created = summary.created,
        updated = summary.updated,
        "bulk import applied"
    );

    Ok(Json(summary))
}

async fn day_create(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateDayPayload>,
) -> ApiResult<(StatusCode, Json<Day>)> {
    validate_day_number(payload.day_number).map_err(ApiError::bad_request)?;

    let database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    let checklist = payload
        .checklist_text
        .as_deref()
        .map(parse_checklist_text)
        .unwrap_or_default();
    let day = Day::new(payload.day_number, payload.title.trim(), checklist);

    if !database.create_day(tracker_id, &day)? {
        return Err(ApiError::Conflict(format!(
            "Day {} already exists in tracker {slug}",
            day.day_number
        )));
    }

    Ok((StatusCode::CREATED, Json(day)))
}

async fn day_update(
    State(state): State<ApiState>,
    Path((slug, day_number)): Path<(String, u32)>,
    Json(payload): Json<UpdateDayPayload>,
) -> ApiResult<Json<Day>> {
    if let Some(hours) = payload.hours_logged {
        validate_hours_logged(hours).map_err(ApiError::bad_request)?;
    }

    let database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    let update = DayUpdate {
        title: payload.title.map(|title| title.trim().to_string()),
        status: payload.status,
        hours_logged: payload.hours_logged,
        notes: payload.notes,
        mood: payload.mood,
        checklist: payload.checklist_text.as_deref().map(parse_checklist_text),
    };

    if !database.update_day(tracker_id, day_number, &update)? {
        return Err(day_not_found(&slug, day_number));
    }

    database
        .days_for_tracker(tracker_id)?
        .into_iter()
        .find(|day| day.day_number == day_number)
        .map(Json)
        .ok_or_else(|| day_not_found(&slug, day_number))
}

async fn day_delete(
    State(state): State<ApiState>,
    Path((slug, day_number)): Path<(String, u32)>,
) -> ApiResult<Json<Value>> {
    let database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    if !database.delete_day(tracker_id, day_number)? {
        return Err(day_not_found(&slug, day_number));
    }

    Ok(Json(json!({ "deleted": true, "dayNumber": day_number })))
}

async fn checklist_toggle(
    State(state): State<ApiState>,
    Path((slug, day_number, index)): Path<(String, u32, usize)>,
) -> ApiResult<Json<ChecklistItem>> {
    let mut database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    database
        .toggle_checklist_item(tracker_id, day_number, index)?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Checklist item {index} not found on day {day_number} of {slug}"
            ))
        })
}

async fn milestone_create(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateMilestonePayload>,
) -> ApiResult<(StatusCode, Json<Milestone>)> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    validate_day_number(payload.day_number).map_err(ApiError::bad_request)?;

    let database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    let milestone = Milestone {
        title,
        day_number: payload.day_number,
        completed: false,
    };
    database.add_milestone(tracker_id, &milestone)?;

    Ok((StatusCode::CREATED, Json(milestone)))
}

async fn milestone_toggle(
    State(state): State<ApiState>,
    Path((slug, index)): Path<(String, usize)>,
) -> ApiResult<Json<Milestone>> {
    let database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    database
        .toggle_milestone(tracker_id, index)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Milestone {index} not found in {slug}")))
}

async fn milestone_delete(
    State(state): State<ApiState>,
    Path((slug, index)): Path<(String, usize)>,
) -> ApiResult<Json<Value>> {
    let database = Database::open(&state.config.db_path)?;
    let tracker_id = resolve_tracker_id(&database, &slug)?;

    if !database.delete_milestone(tracker_id, index)? {
        return Err(ApiError::NotFound(format!(
            "Milestone {index} not found in {slug}"
        )));
    }

    Ok(Json(json!({ "deleted": true })))
}

fn resolve_tracker_id(database: &Database, slug: &str) -> ApiResult<i64> {
    database
        .tracker_id(slug)?
        .ok_or_else(|| ApiError::NotFound(format!("Tracker not found: {slug}")))
}

fn load_tracker(database: &Database, slug: &str) -> ApiResult<Tracker> {
    database
        .load_tracker(slug)?
        .ok_or_else(|| ApiError::NotFound(format!("Tracker not found: {slug}")))
}

fn day_not_found(slug: &str, day_number: u32) -> ApiError {
    ApiError::NotFound(format!("Day {day_number} not found in tracker {slug}"))
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn bad_request(error: anyhow::Error) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(error) => {
                tracing::error!(error = %error, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": error.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ApiError, ApiResult, ApiState, CreateDayPayload, CreateTrackerPayload, ImportPayload,
        UpdateDayPayload, day_create, day_update, router, tracker_create, tracker_import,
        tracker_stats,
    };
    use crate::config::Config;
    use crate::db::ImportSummary;
    use axum::Json;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> ApiState {
        ApiState {
            config: Arc::new(Config {
                db_path: dir.path().join("db").join("tracker.db"),
                report_dir: dir.path().join("reports"),
                ..Config::default()
            }),
        }
    }

    fn tracker_payload(slug: &str) -> CreateTrackerPayload {
        CreateTrackerPayload {
            slug: slug.to_string(),
            title: "Rust in 30 days".to_string(),
            description: String::new(),
            start_date: None,
            total_days: Some(30),
            daily_hours: Some(2.0),
        }
    }

    fn day_payload(day_number: u32) -> CreateDayPayload {
        CreateDayPayload {
            day_number,
            title: "Ownership".to_string(),
            checklist_text: Some("[x] Read chapter 4 (hr1)".to_string()),
        }
    }

    fn hours_payload(hours: f64) -> UpdateDayPayload {
        UpdateDayPayload {
            title: None,
            status: None,
            hours_logged: Some(hours),
            notes: None,
            mood: None,
            checklist_text: None,
        }
    }

    fn error_status<T>(result: ApiResult<T>) -> StatusCode {
        match result {
            Ok(_) => panic!("request was expected to fail"),
            Err(error) => error.into_response().status(),
        }
    }

    async fn state_with_tracker(dir: &TempDir) -> ApiState {
        let state = state_in(dir);
        let (status, Json(tracker)) =
            tracker_create(State(state.clone()), Json(tracker_payload("rust-30")))
                .await
                .expect("create tracker");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tracker.total_days, 30);
        state
    }

    #[test]
    fn router_builds_without_conflicting_routes() {
        let _ = router(ApiState {
            config: Arc::new(Config::default()),
        });
    }

    #[test]
    fn api_errors_map_to_status_codes() {
        let cases = [
            (ApiError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("missing".to_string()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("taken".to_string()), StatusCode::CONFLICT),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn import_without_day_headers_is_a_no_op() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = state_with_tracker(&dir).await;

        let Json(summary) = tracker_import(
            State(state.clone()),
            Path("rust-30".to_string()),
            Json(ImportPayload {
                bulk_text: "just notes\n- no day header above".to_string(),
            }),
        )
        .await
        .expect("empty import succeeds");

        assert_eq!(summary, ImportSummary::default());
        let Json(stats) = tracker_stats(State(state), Path("rust-30".to_string()))
            .await
            .expect("stats");
        assert_eq!(stats.days_logged, 0);
    }

    #[tokio::test]
    async fn duplicate_slug_and_day_conflict() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = state_with_tracker(&dir).await;

        let again = tracker_create(State(state.clone()), Json(tracker_payload("rust-30"))).await;
        assert_eq!(error_status(again), StatusCode::CONFLICT);

        let (status, Json(day)) = day_create(
            State(state.clone()),
            Path("rust-30".to_string()),
            Json(day_payload(3)),
        )
        .await
        .expect("create day");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(day.checklist.len(), 1);

        let duplicate = day_create(
            State(state),
            Path("rust-30".to_string()),
            Json(day_payload(3)),
        )
        .await;
        assert_eq!(error_status(duplicate), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn day_numbers_outside_bounds_are_bad_requests() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = state_with_tracker(&dir).await;

        for day_number in [0, 70_000_000] {
            let result = day_create(
                State(state.clone()),
                Path("rust-30".to_string()),
                Json(day_payload(day_number)),
            )
            .await;
            assert_eq!(error_status(result), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn invalid_hours_are_bad_requests() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = state_with_tracker(&dir).await;
        day_create(
            State(state.clone()),
            Path("rust-30".to_string()),
            Json(day_payload(1)),
        )
        .await
        .expect("create day");

        for hours in [-1.0, f64::NAN] {
            let result = day_update(
                State(state.clone()),
                Path(("rust-30".to_string(), 1)),
                Json(hours_payload(hours)),
            )
            .await;
            assert_eq!(error_status(result), StatusCode::BAD_REQUEST);
        }

        let Json(day) = day_update(
            State(state),
            Path(("rust-30".to_string(), 1)),
            Json(hours_payload(1.5)),
        )
        .await
        .expect("valid hours");
        assert_eq!(day.hours_logged, 1.5);
    }

    #[tokio::test]
    async fn tracker_create_bounds_plan_length_and_daily_hours() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = state_in(&dir);

        let mut huge = tracker_payload("huge");
        huge.total_days = Some(u32::MAX);
        let result = tracker_create(State(state.clone()), Json(huge)).await;
        assert_eq!(error_status(result), StatusCode::BAD_REQUEST);

        for hours in [-1.0, 25.0, f64::NAN] {
            let mut payload = tracker_payload("hours");
            payload.daily_hours = Some(hours);
            let result = tracker_create(State(state.clone()), Json(payload)).await;
            assert_eq!(error_status(result), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn mistyped_day_header_does_not_inflate_stats() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = state_with_tracker(&dir).await;

        let Json(summary) = tracker_import(
            State(state.clone()),
            Path("rust-30".to_string()),
            Json(ImportPayload {
                bulk_text: "Day 1: Setup\n- Install\nDay 70000000: typo\n- task".to_string(),
            }),
        )
        .await
        .expect("import");
        assert_eq!(summary.parsed, 1);

        let Json(stats) = tracker_stats(State(state), Path("rust-30".to_string()))
            .await
            .expect("stats");
        assert_eq!(stats.weekly_stats.len(), 5);
        assert_eq!(stats.monthly_stats.len(), 1);
    }
}
