use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/users/dashboard/", get(handlers::dashboard_page))
        .route("/users/dashboard/actions/:node", post(handlers::click_action))
        .route("/api/dashboard", get(handlers::dashboard_snapshot))
        .route("/api/dashboard/actions", put(handlers::render_actions))
        .route("/meditation/", get(handlers::meditation_page))
        .route("/meditation/start", post(handlers::start_meditation))
        .route("/meditation/stop", post(handlers::stop_meditation))
        .route("/api/meditation", get(handlers::meditation_snapshot))
        .with_state(state)
}
