use crate::auth::{self, CurrentUser};
use crate::dates::{self, MonthBlock, RollingGrid, date_key, parse_date_key};
use crate::demo;
use crate::entries::EntryIndex;
use crate::errors::AppError;
use crate::models::{
    CreateHabitRequest, EntryRecord, HabitKind, HabitRecord, LogEntryRequest, LoginRequest,
    SessionResponse, SignupRequest, UpdateHabitRequest, UserRecord, default_active_days,
    default_enabled_stats,
};
use crate::overview::{self, HabitWindow, Overview};
use crate::state::AppState;
use crate::stats::{self, HabitStats, Window};
use crate::storage::persist_data;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

const DEFAULT_COLOR: &str = "#10b981";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: HabitRecord,
    pub current_streak: u32,
    pub total_entries: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDetail {
    #[serde(flatten)]
    pub habit: HabitRecord,
    pub year: i32,
    pub stats: HabitStats,
    pub months: Vec<MonthBlock>,
}

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub stats: HabitStats,
    #[serde(flatten)]
    pub grid: RollingGrid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedView {
    pub name: String,
    pub color: String,
    pub unit: Option<String>,
    #[serde(rename = "type")]
    pub kind: HabitKind,
    pub allow_direct_log: bool,
    pub stats: HabitStats,
    #[serde(flatten)]
    pub grid: RollingGrid,
}

#[derive(Debug, Serialize)]
pub struct DemoView {
    pub name: &'static str,
    pub color: &'static str,
    pub stats: HabitStats,
    #[serde(flatten)]
    pub grid: RollingGrid,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("a valid email is required"));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let mut data = state.data.lock().await;
    if data.user_by_email(&email).is_some() {
        return Err(AppError::bad_request("email already registered"));
    }

    let salt = auth::new_salt();
    let user = UserRecord {
        id: auth::new_id(),
        email,
        name: payload.name,
        password_hash: auth::hash_password(&payload.password, &salt),
        salt,
        created_at: date_key(today()),
    };
    let token = auth::new_session_token();
    let user_id = user.id.clone();
    data.sessions.insert(token.clone(), user_id.clone());
    data.users.insert(user_id.clone(), user);
    persist_data(&state.data_path, &data).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse { token, user_id })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    let mut data = state.data.lock().await;

    let user_id = data
        .user_by_email(&email)
        .filter(|user| auth::hash_password(&payload.password, &user.salt) == user.password_hash)
        .map(|user| user.id.clone())
        .ok_or_else(AppError::unauthorized)?;

    let token = auth::new_session_token();
    data.sessions.insert(token.clone(), user_id.clone());
    persist_data(&state.data_path, &data).await?;

    Ok(Json(SessionResponse { token, user_id }))
}

pub async fn list_habits(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<HabitSummary>>, AppError> {
    let as_of = today();
    let data = state.data.lock().await;

    let summaries = data
        .habits_for(&user.id)
        .into_iter()
        .map(|habit| {
            let index = EntryIndex::build(data.entries_for(&habit.id));
            let rolling = stats::calculate_stats(Window::Rolling, &index, habit.goal_value, as_of);
            HabitSummary {
                habit: habit.clone(),
                current_streak: rolling.current_streak,
                total_entries: rolling.total_entries,
            }
        })
        .collect();

    Ok(Json(summaries))
}

pub async fn create_habit(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitRecord>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("habit name is required"));
    }
    if let Some(goal) = payload.goal_value {
        if !goal.is_finite() || goal < 0.0 {
            return Err(AppError::bad_request("goal must be a non-negative number"));
        }
    }

    let habit = HabitRecord {
        id: auth::new_id(),
        user_id: user.id,
        name: payload.name.trim().to_string(),
        description: payload.description,
        color: payload.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        unit: payload.unit,
        goal_value: payload.goal_value,
        goal_period: payload.goal_period,
        kind: payload.kind,
        private: payload.private.unwrap_or(false),
        active_days: payload.active_days.unwrap_or_else(default_active_days),
        enabled_stats: payload.enabled_stats.unwrap_or_else(default_enabled_stats),
        embed_token: auth::new_embed_token(),
        allow_direct_log: false,
        created_at: date_key(today()),
    };

    let mut data = state.data.lock().await;
    data.habits.insert(habit.id.clone(), habit.clone());
    persist_data(&state.data_path, &data).await?;

    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn get_habit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
    Query(query): Query<YearQuery>,
) -> Result<Json<HabitDetail>, AppError> {
    let as_of = today();
    let year = query.year.unwrap_or_else(|| as_of.year());
    if !(1..=9999).contains(&year) {
        return Err(AppError::bad_request("year out of range"));
    }

    let data = state.data.lock().await;
    let habit = data
        .owned_habit(&user.id, &habit_id)
        .ok_or_else(|| AppError::not_found("habit not found"))?;
    let entries = data.entries_for(&habit_id);

    let year_stats = stats::calculate_stats(
        Window::FixedYear(year),
        &EntryIndex::build(entries.iter().copied()),
        habit.goal_value,
        as_of,
    );
    // The grid shows completed/not-completed cells; the stats above keep
    // the raw values.
    let display = EntryIndex::build_binarized(entries, habit.goal_value);
    let months = dates::year_grid(year, &display, as_of);

    Ok(Json(HabitDetail {
        habit: habit.clone(),
        year,
        stats: year_stats,
        months,
    }))
}

pub async fn update_habit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitRecord>, AppError> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("habit name cannot be empty"));
        }
    }
    if let Some(goal) = payload.goal_value {
        if !goal.is_finite() || goal < 0.0 {
            return Err(AppError::bad_request("goal must be a non-negative number"));
        }
    }

    let mut data = state.data.lock().await;
    if data.owned_habit(&user.id, &habit_id).is_none() {
        return Err(AppError::not_found("habit not found"));
    }
    let Some(habit) = data.habits.get_mut(&habit_id) else {
        return Err(AppError::not_found("habit not found"));
    };

    if let Some(name) = payload.name {
        habit.name = name.trim().to_string();
    }
    if let Some(description) = payload.description {
        habit.description = Some(description);
    }
    if let Some(unit) = payload.unit {
        habit.unit = Some(unit);
    }
    if let Some(color) = payload.color {
        habit.color = color;
    }
    if let Some(goal_value) = payload.goal_value {
        habit.goal_value = Some(goal_value);
    }
    if let Some(goal_period) = payload.goal_period {
        habit.goal_period = Some(goal_period);
    }
    if let Some(private) = payload.private {
        habit.private = private;
    }
    if let Some(allow_direct_log) = payload.allow_direct_log {
        habit.allow_direct_log = allow_direct_log;
    }
    if let Some(active_days) = payload.active_days {
        habit.active_days = active_days;
    }
    if let Some(enabled_stats) = payload.enabled_stats {
        habit.enabled_stats = enabled_stats;
    }
    let updated = habit.clone();
    persist_data(&state.data_path, &data).await?;

    Ok(Json(updated))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    if data.owned_habit(&user.id, &habit_id).is_none() {
        return Err(AppError::not_found("habit not found"));
    }
    data.remove_habit(&habit_id);
    persist_data(&state.data_path, &data).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn habit_heatmap(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
) -> Result<Json<HeatmapResponse>, AppError> {
    let as_of = today();
    let data = state.data.lock().await;
    let habit = data
        .owned_habit(&user.id, &habit_id)
        .ok_or_else(|| AppError::not_found("habit not found"))?;
    let entries = data.entries_for(&habit_id);

    let rolling_stats = stats::calculate_stats(
        Window::Rolling,
        &EntryIndex::build(entries.iter().copied()),
        habit.goal_value,
        as_of,
    );
    let grid = dates::rolling_grid(
        &EntryIndex::build_binarized(entries, habit.goal_value),
        as_of,
    );

    Ok(Json(HeatmapResponse {
        stats: rolling_stats,
        grid,
    }))
}

pub async fn list_entries(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
    Query(query): Query<EntryRangeQuery>,
) -> Result<Json<Vec<EntryRecord>>, AppError> {
    let from = canonical_bound(query.start_date.as_deref())?;
    let to = canonical_bound(query.end_date.as_deref())?;

    let data = state.data.lock().await;
    if data.owned_habit(&user.id, &habit_id).is_none() {
        return Err(AppError::not_found("habit not found"));
    }

    let mut entries: Vec<EntryRecord> = data
        .entries_between(&habit_id, from.as_deref(), to.as_deref())
        .into_iter()
        .cloned()
        .collect();
    // Newest first, like the original API.
    entries.reverse();

    Ok(Json(entries))
}

pub async fn log_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
    Json(payload): Json<LogEntryRequest>,
) -> Result<Json<EntryRecord>, AppError> {
    let mut data = state.data.lock().await;
    let habit = data
        .owned_habit(&user.id, &habit_id)
        .ok_or_else(|| AppError::not_found("habit not found"))?;
    let date = validate_entry(habit, &payload.date, payload.value)?;

    let entry = data.upsert_entry(&habit_id, date, payload.value, payload.journal);
    persist_data(&state.data_path, &data).await?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((habit_id, entry_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    if data.owned_habit(&user.id, &habit_id).is_none() {
        return Err(AppError::not_found("habit not found"));
    }
    if !data.delete_entry(&habit_id, &entry_id) {
        return Err(AppError::not_found("entry not found"));
    }
    persist_data(&state.data_path, &data).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard_overview(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Overview>, AppError> {
    let as_of = today();
    let data = state.data.lock().await;

    let windows: Vec<HabitWindow> = data
        .habits_for(&user.id)
        .into_iter()
        .map(|habit| HabitWindow {
            goal_value: habit.goal_value,
            index: EntryIndex::build(data.entries_for(&habit.id)),
        })
        .collect();

    Ok(Json(overview::build_overview(&windows, as_of)))
}

pub async fn embed_view(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<EmbedView>, AppError> {
    let as_of = today();
    let data = state.data.lock().await;
    let habit = data
        .habit_by_token(&token)
        .ok_or_else(|| AppError::not_found("habit not found"))?;
    let entries = data.entries_for(&habit.id);

    let rolling_stats = stats::calculate_stats(
        Window::Rolling,
        &EntryIndex::build(entries.iter().copied()),
        habit.goal_value,
        as_of,
    );
    let grid = dates::rolling_grid(
        &EntryIndex::build_binarized(entries, habit.goal_value),
        as_of,
    );

    Ok(Json(EmbedView {
        name: habit.name.clone(),
        color: habit.color.clone(),
        unit: habit.unit.clone(),
        kind: habit.kind,
        allow_direct_log: habit.allow_direct_log,
        stats: rolling_stats,
        grid,
    }))
}

pub async fn embed_log(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<LogEntryRequest>,
) -> Result<Json<EntryRecord>, AppError> {
    let mut data = state.data.lock().await;
    let (habit_id, date) = {
        let habit = data
            .habit_by_token(&token)
            .ok_or_else(|| AppError::not_found("habit not found"))?;
        if !habit.allow_direct_log {
            return Err(AppError::forbidden(
                "direct logging is not enabled for this habit",
            ));
        }
        let date = validate_entry(habit, &payload.date, payload.value)?;
        (habit.id.clone(), date)
    };

    let entry = data.upsert_entry(&habit_id, date, payload.value, payload.journal);
    persist_data(&state.data_path, &data).await?;

    Ok(Json(entry))
}

pub async fn demo_view() -> Json<DemoView> {
    let as_of = today();
    let entries = demo::sample_entries(demo::DEMO_SEED, as_of);
    let index = EntryIndex::build(&entries);

    Json(DemoView {
        name: demo::DEMO_HABIT_NAME,
        color: demo::DEMO_HABIT_COLOR,
        stats: stats::calculate_stats(Window::Rolling, &index, None, as_of),
        grid: dates::rolling_grid(&index, as_of),
    })
}

// "Today" is read once per request and threaded through every
// computation below it.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn validate_entry(habit: &HabitRecord, raw_date: &str, value: f64) -> Result<String, AppError> {
    let date = parse_date_key(raw_date)
        .ok_or_else(|| AppError::bad_request("date must be formatted YYYY-MM-DD"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::bad_request("value must be a non-negative number"));
    }
    if habit.kind == HabitKind::Checkbox && value != 0.0 && value != 1.0 {
        return Err(AppError::bad_request("checkbox habits accept only 0 or 1"));
    }
    Ok(date_key(date))
}

fn canonical_bound(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw {
        None => Ok(None),
        Some(raw) => parse_date_key(raw)
            .map(|date| Some(date_key(date)))
            .ok_or_else(|| AppError::bad_request("date bounds must be formatted YYYY-MM-DD")),
    }
}
