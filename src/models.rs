use crate::surface::NodeId;
use chrono::Local;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Pending,
    Processing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    pub action_text: String,
    pub state_context: String,
    pub test_id: Option<String>,
    pub display_state: DisplayState,
}

/// Index-aligned score history embedded in the dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSeries {
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub dates: Vec<String>,
}

impl ScoreSeries {
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub action_text: String,
    pub completed_at: String,
}

impl CompletedTask {
    /// Record stamped with the local clock, for replies that omit one.
    pub fn now(action_text: impl Into<String>) -> Self {
        Self {
            action_text: action_text.into(),
            completed_at: Local::now().format("%b %d, %Y %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteActionRequest {
    pub action_text: String,
    pub state_context: String,
    pub test_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed_action: Option<CompletedTask>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CompleteActionResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// What the server renders into the dashboard page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub state_context: String,
    #[serde(default)]
    pub test_id: Option<String>,
    #[serde(default)]
    pub completed: Vec<CompletedTask>,
}

impl PageData {
    pub fn score_series(&self) -> ScoreSeries {
        ScoreSeries {
            scores: self.scores.clone(),
            dates: self.dates.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderActionsRequest {
    pub actions: Vec<String>,
    #[serde(default)]
    pub state_context: String,
    #[serde(default)]
    pub test_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToastView {
    pub kind: String,
    pub message: String,
    pub leaving: bool,
}

/// An action item together with the node a click has to target.
#[derive(Debug, Clone, Serialize)]
pub struct PendingItem {
    pub node: NodeId,
    #[serde(flatten)]
    pub item: ActionItem,
}

#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub pending: Vec<PendingItem>,
    pub completed: Vec<CompletedTask>,
    pub toasts: Vec<ToastView>,
    pub chart_rendered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub running: bool,
    pub elapsed_seconds: u64,
    pub display: String,
    pub status: String,
}
