use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/heatmap", get(handlers::habit_heatmap))
        .route(
            "/api/habits/:id/entries",
            get(handlers::list_entries).post(handlers::log_entry),
        )
        .route(
            "/api/habits/:id/entries/:entry_id",
            delete(handlers::delete_entry),
        )
        .route("/api/dashboard/overview", get(handlers::dashboard_overview))
        .route("/api/public/habits/:token", get(handlers::embed_view))
        .route("/api/public/habits/:token/log", post(handlers::embed_log))
        .route("/api/demo", get(handlers::demo_view))
        .with_state(state)
}
