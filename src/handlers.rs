use crate::day_key::{DayKey, Month};
use crate::errors::AppError;
use crate::models::{
    CalendarQuery, CalendarResponse, CompletionRequest, CompletionResponse, Routine, RoutineId,
    RoutineView, RoutinesResponse, SelectRequest, StatsResponse, TitleRequest, ToggleRequest,
    TodayResponse,
};
use crate::state::AppState;
use crate::stats::build_stats_at;
use crate::store::RoutineStore;
use crate::ui::render_index;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::Html,
};
use chrono::NaiveDate;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    Html(render_index(&store))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let store = state.store.lock().await;
    let today = store.today();

    Ok(Json(TodayResponse {
        date: DayKey::from_day(today).to_string(),
        total: store.len(),
        completed: store.completed_count(&today),
        remaining: store.remaining_count(&today),
    }))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(build_stats_at(store.today(), store.routines(), store.calendar())))
}

pub async fn list_routines(State(state): State<AppState>) -> Result<Json<RoutinesResponse>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(routines_response(&store)))
}

pub async fn create_routine(
    State(state): State<AppState>,
    Json(payload): Json<TitleRequest>,
) -> Result<(StatusCode, Json<RoutineView>), AppError> {
    let mut store = state.store.lock().await;
    let id = store
        .add(&payload.title)
        .await
        .ok_or_else(|| AppError::bad_request("title must not be empty"))?;

    let view = routine_view(&store, find(&store, id)?);
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn rename_routine(
    State(state): State<AppState>,
    Path(id): Path<RoutineId>,
    Json(payload): Json<TitleRequest>,
) -> Result<Json<RoutineView>, AppError> {
    let mut store = state.store.lock().await;
    find(&store, id)?;
    if !store.update_title(id, &payload.title).await {
        return Err(AppError::bad_request("title must not be empty"));
    }

    Ok(Json(routine_view(&store, find(&store, id)?)))
}

pub async fn delete_routine(
    State(state): State<AppState>,
    Path(id): Path<RoutineId>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    if !store.delete(id).await {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_routine(
    State(state): State<AppState>,
    Path(id): Path<RoutineId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CompletionResponse>, AppError> {
    let payload = toggle_payload(&headers, &body)?;
    let mut store = state.store.lock().await;
    let day = requested_day(payload.date.as_deref(), &store)?;
    if !store.toggle_completion(id, day).await {
        return Err(not_found(id));
    }

    completion_response(&store, id, day)
}

pub async fn set_routine_completion(
    State(state): State<AppState>,
    Path(id): Path<RoutineId>,
    Json(payload): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, AppError> {
    let mut store = state.store.lock().await;
    let day = requested_day(payload.date.as_deref(), &store)?;
    if !store.set_completion(id, day, payload.completed).await {
        return Err(not_found(id));
    }

    completion_response(&store, id, day)
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(id): Path<RoutineId>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let store = state.store.lock().await;
    let routine = find(&store, id)?;
    let today = store.today();

    let month = match (query.year, query.month) {
        (None, None) => Month::of(today),
        (year, month) => {
            let fallback = Month::of(today);
            Month::new(year.unwrap_or(fallback.year()), month.unwrap_or(fallback.month()))
                .ok_or_else(|| AppError::bad_request("invalid year or month"))?
        }
    };

    Ok(Json(CalendarResponse {
        routine_id: routine.id,
        title: routine.title.clone(),
        grid: store.calendar_status(routine, month, &today),
    }))
}

pub async fn select_routine(
    State(state): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<RoutinesResponse>, AppError> {
    let mut store = state.store.lock().await;
    if !store.select(payload.id) {
        return Err(not_found(payload.id));
    }
    Ok(Json(routines_response(&store)))
}

/// An empty body toggles today; anything else must be a valid JSON request.
fn toggle_payload(headers: &HeaderMap, body: &Bytes) -> Result<ToggleRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ToggleRequest::default());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"));
    if !is_json {
        return Err(AppError::bad_request("expected content-type application/json"));
    }

    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid toggle request: {err}")))
}

fn requested_day(raw: Option<&str>, store: &RoutineStore) -> Result<NaiveDate, AppError> {
    match raw {
        None => Ok(store.today()),
        Some(raw) => DayKey::parse(raw.trim())
            .and_then(|key| key.to_date())
            .ok_or_else(|| AppError::bad_request("date must be YYYY-MM-DD")),
    }
}

fn completion_response(
    store: &RoutineStore,
    id: RoutineId,
    day: NaiveDate,
) -> Result<Json<CompletionResponse>, AppError> {
    let routine = find(store, id)?;
    Ok(Json(CompletionResponse {
        id,
        date: DayKey::from_day(day).to_string(),
        completed: store.is_completed(id, &day),
        streak: store.current_streak(routine, &store.today()),
    }))
}

fn routines_response(store: &RoutineStore) -> RoutinesResponse {
    RoutinesResponse {
        date: DayKey::from_day(store.today()).to_string(),
        selected: store.selected(),
        routines: store
            .routines()
            .iter()
            .map(|routine| routine_view(store, routine))
            .collect(),
    }
}

fn routine_view(store: &RoutineStore, routine: &Routine) -> RoutineView {
    let today = store.today();
    RoutineView {
        id: routine.id,
        title: routine.title.clone(),
        created_at: routine.created_at,
        completed_today: store.is_completed(routine.id, &today),
        total_completions: routine.completions.len(),
        streak: store.current_streak(routine, &today),
    }
}

fn find(store: &RoutineStore, id: RoutineId) -> Result<&Routine, AppError> {
    store.routine(id).ok_or_else(|| not_found(id))
}

fn not_found(id: RoutineId) -> AppError {
    AppError::not_found(format!("routine {id} not found"))
}
