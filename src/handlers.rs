use crate::errors::AppError;
use crate::models::{DashboardSnapshot, RenderActionsRequest, TimerSnapshot};
use crate::state::AppState;
use crate::surface::NodeId;
use crate::transport::CompletionTransport;
use crate::ui::{render_dashboard_page, render_meditation_page};
use axum::{
    Json,
    extract::{Path, State},
    response::{Html, Redirect},
};
use tracing::debug;

const DASHBOARD_PATH: &str = "/users/dashboard/";
const MEDITATION_PATH: &str = "/meditation/";

pub async fn index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.sweep_toasts();
    Html(render_dashboard_page(&dashboard.surface().render_body()))
}

pub async fn dashboard_snapshot(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.sweep_toasts();
    Json(dashboard.snapshot())
}

/// Clicks the action item rendered with `data-node="{node}"`. The dashboard
/// lock is released while the completion request is in flight.
pub async fn click_action(
    State(state): State<AppState>,
    Path(node): Path<NodeId>,
) -> Result<Redirect, AppError> {
    let pending = {
        let mut dashboard = state.dashboard.lock().await;
        if !dashboard.is_bound(node) {
            return Err(AppError::not_found(format!("no action item with node {node}")));
        }
        dashboard.click(node)
    };

    if let Some(pending) = pending {
        let reply = state
            .transport
            .complete(pending.request(), pending.csrf_token())
            .await;
        let action_text = pending.request().action_text.clone();
        match state.dashboard.lock().await.finish_completion(pending, reply) {
            Ok(task) => debug!(node, action = %task.action_text, "click completed"),
            // already reported on the page as a toast
            Err(err) => debug!(node, action = %action_text, error = %err, "click failed"),
        }
    }

    Ok(Redirect::to(DASHBOARD_PATH))
}

pub async fn render_actions(
    State(state): State<AppState>,
    Json(payload): Json<RenderActionsRequest>,
) -> Json<DashboardSnapshot> {
    let mut dashboard = state.dashboard.lock().await;
    dashboard.render_action_list(
        &payload.actions,
        &payload.state_context,
        payload.test_id.as_deref(),
    );
    Json(dashboard.snapshot())
}

pub async fn meditation_page(State(state): State<AppState>) -> Html<String> {
    let meditation = state.meditation.lock().await;
    let body = meditation.with_surface(|doc| doc.render_body()).await;
    Html(render_meditation_page(&body))
}

pub async fn meditation_snapshot(State(state): State<AppState>) -> Json<TimerSnapshot> {
    let meditation = state.meditation.lock().await;
    Json(meditation.snapshot().await)
}

pub async fn start_meditation(State(state): State<AppState>) -> Redirect {
    state.meditation.lock().await.start().await;
    Redirect::to(MEDITATION_PATH)
}

pub async fn stop_meditation(State(state): State<AppState>) -> Redirect {
    state.meditation.lock().await.stop().await;
    Redirect::to(MEDITATION_PATH)
}
