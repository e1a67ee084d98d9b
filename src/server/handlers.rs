use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{error::ApiError, AppState};
use crate::aggregate::{self, EnergyEstimate, EnergyRequest};
use crate::error::JournalError;
use crate::journal::Export;
use crate::models::{
    time_format, GoalPlan, GoalUpdate, MealEntry, MealInput, MealTemplate, PhotoEntry, PhotoInput,
    Settings, TemplateInput, ValidationError, WeightEntry, WeightInput, WorkoutEntry, WorkoutInput,
};
use crate::store::UserId;

type ApiResult<T> = Result<Json<T>, ApiError>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

const DEFAULT_HISTORY_DAYS: u32 = 7;
const MAX_SERIES_DAYS: i64 = 366;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no identity required)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::version(),
    })
}

#[derive(Serialize)]
pub struct MeResponse {
    user_id: UserId,
}

pub async fn me(Extension(user): Extension<UserId>) -> Json<MeResponse> {
    Json(MeResponse { user_id: user })
}

// ============================================================================
// Read views
// ============================================================================

pub async fn today(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<aggregate::TodaySummary> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::today_summary(&doc, state.clock.now())))
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    days: Option<u32>,
}

fn check_days(days: u32) -> Result<u32, ApiError> {
    if days == 0 || i64::from(days) > MAX_SERIES_DAYS {
        return Err(JournalError::from(ValidationError::new(format!(
            "days must be between 1 and {}",
            MAX_SERIES_DAYS
        )))
        .into());
    }
    Ok(days)
}

pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> ApiResult<Vec<aggregate::DailyTotals>> {
    let Query(query) = query?;
    let days = check_days(query.days.unwrap_or(DEFAULT_HISTORY_DAYS))?;
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::trailing_series(&doc, state.clock.now(), days)))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    start: String,
    end: String,
}

pub async fn range(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Vec<aggregate::DailyTotals>> {
    let Query(query) = query?;
    let start: NaiveDate = time_format::parse_date(&query.start).map_err(JournalError::from)?;
    let end: NaiveDate = time_format::parse_date(&query.end).map_err(JournalError::from)?;
    if (end - start).num_days() >= MAX_SERIES_DAYS {
        return Err(JournalError::from(ValidationError::new(format!(
            "range may span at most {} days",
            MAX_SERIES_DAYS
        )))
        .into());
    }

    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::range_series(&doc, start, end)))
}

pub async fn streak(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<aggregate::Streak> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::logging_streak(&doc, state.clock.now())))
}

pub async fn weight_history(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> ApiResult<aggregate::WeightHistory> {
    let Query(query) = query?;
    let days = query.days.map(check_days).transpose()?;
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::weight_history(&doc, state.clock.now(), days)))
}

pub async fn goal_projection(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<aggregate::GoalProjection> {
    let doc = state.journal.read(&user).await?;
    let plan = doc
        .goal_plan
        .as_ref()
        .ok_or_else(|| JournalError::not_found("goal plan"))?;
    Ok(Json(aggregate::goal_projection(
        &doc,
        plan,
        state.clock.now(),
    )))
}

pub async fn progress_card(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<aggregate::WeeklyRecap> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::weekly_recap(&doc, state.clock.now())))
}

pub async fn meal_history(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Vec<aggregate::DayMeals>> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::meal_history(&doc)))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<aggregate::Dashboard> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(aggregate::dashboard(&doc, state.clock.now())))
}

pub async fn export_data(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Export> {
    Ok(Json(state.journal.export(&user, state.clock.now()).await?))
}

pub async fn progress_photos(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Vec<PhotoEntry>> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(doc.progress_photos))
}

pub async fn list_templates(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<Vec<MealTemplate>> {
    let doc = state.journal.read(&user).await?;
    Ok(Json(doc.meal_templates))
}

// ============================================================================
// Mutations
// ============================================================================

pub async fn add_meal(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<MealInput>, JsonRejection>,
) -> Created<MealEntry> {
    let Json(input) = payload?;
    let meal = state
        .journal
        .log_meal(&user, input, state.clock.now())
        .await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

#[derive(Debug, Deserialize)]
pub struct DeleteMealRequest {
    index: usize,
}

pub async fn delete_meal(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<DeleteMealRequest>, JsonRejection>,
) -> ApiResult<MealEntry> {
    let Json(request) = payload?;
    Ok(Json(state.journal.delete_meal(&user, request.index).await?))
}

pub async fn log_weight(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<WeightInput>, JsonRejection>,
) -> Created<WeightEntry> {
    let Json(input) = payload?;
    let entry = state
        .journal
        .log_weight(&user, input, state.clock.now())
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn log_workout(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<WorkoutInput>, JsonRejection>,
) -> Created<WorkoutEntry> {
    let Json(input) = payload?;
    let workout = state
        .journal
        .log_workout(&user, input, state.clock.instant())
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn update_goals(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<GoalUpdate>, JsonRejection>,
) -> ApiResult<Settings> {
    let Json(update) = payload?;
    Ok(Json(state.journal.update_goals(&user, update).await?))
}

pub async fn save_goals(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<GoalPlan>, JsonRejection>,
) -> ApiResult<Settings> {
    let Json(plan) = payload?;
    Ok(Json(state.journal.save_goal_plan(&user, plan, state.clock.now()).await?))
}

/// Pure calculator; nothing is stored.
pub async fn calculate_goals(
    payload: Result<Json<EnergyRequest>, JsonRejection>,
) -> ApiResult<EnergyEstimate> {
    let Json(request) = payload?;
    let params = request.into_params().map_err(JournalError::from)?;
    let estimate = aggregate::bmr_tdee(&params).map_err(JournalError::from)?;
    Ok(Json(estimate))
}

#[derive(Serialize)]
pub struct ClearResponse {
    success: bool,
    /// File name only; server paths are not exposed.
    backup_file: String,
}

pub async fn clear_data(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
) -> ApiResult<ClearResponse> {
    let backup = state.journal.clear_all(&user, state.clock.now()).await?;
    Ok(Json(ClearResponse {
        success: true,
        backup_file: backup
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }))
}

pub async fn add_template(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<TemplateInput>, JsonRejection>,
) -> Created<MealTemplate> {
    let Json(input) = payload?;
    let template = state.journal.add_template(&user, input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(id): Path<u32>,
) -> ApiResult<MealTemplate> {
    Ok(Json(state.journal.delete_template(&user, id).await?))
}

pub async fn log_from_template(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(id): Path<u32>,
) -> Created<MealEntry> {
    let meal = state
        .journal
        .log_from_template(&user, id, state.clock.now())
        .await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

pub async fn upload_progress_photo(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<PhotoInput>, JsonRejection>,
) -> Created<PhotoEntry> {
    let Json(input) = payload?;
    let photo = state
        .journal
        .add_photo(&user, input, state.clock.now())
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}
