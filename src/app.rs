use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/today", get(handlers::get_today))
        .route("/api/stats", get(handlers::get_stats))
        .route(
            "/api/routines",
            get(handlers::list_routines).post(handlers::create_routine),
        )
        .route(
            "/api/routines/:id",
            patch(handlers::rename_routine).delete(handlers::delete_routine),
        )
        .route("/api/routines/:id/toggle", post(handlers::toggle_routine))
        .route("/api/routines/:id/completion", put(handlers::set_routine_completion))
        .route("/api/routines/:id/calendar", get(handlers::get_calendar))
        .route("/api/selection", post(handlers::select_routine))
        .with_state(state)
}
