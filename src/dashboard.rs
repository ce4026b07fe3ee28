//! Mental health dashboard controller.
//!
//! Owns the page surface, the action item click subscriptions, the score chart
//! and the toast queue. Completing an action item is split in two halves,
//! [`Dashboard::click`] and [`Dashboard::finish_completion`], so a host can
//! release the dashboard while the request is in flight and let several items
//! be processing at once. [`Dashboard::on_action_click`] runs both halves
//! back to back.

use crate::chart::{ChartBackend, ChartController};
use crate::errors::{CompletionError, PageError};
use crate::models::{
    ActionItem, CompleteActionRequest, CompleteActionResponse, CompletedTask, DashboardSnapshot,
    DisplayState, PendingItem, ScoreSeries,
};
use crate::registry::HandlerRegistry;
use crate::surface::{Element, NodeId, Surface, escape_html};
use crate::toast::{ToastKind, Toaster};
use crate::transport::{CompletionTransport, csrf_token};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub const ACTION_ITEM_CLASS: &str = "action-item";
pub const ACTION_CONTAINER_CLASS: &str = "action-items-container";
pub const COMPLETED_CONTAINER_CLASS: &str = "completed-tasks-container";
pub const COMPLETED_TASK_CLASS: &str = "completed-task";
pub const CHART_CONTAINER_CLASS: &str = "chart-container";
pub const SCORE_DATA_ID: &str = "scoreData";
/// Data key carrying an action item's node id, which clicks are routed on.
pub const NODE_DATA_KEY: &str = "node";

pub const PROCESSING_CLASS: &str = "processing";
pub const COMPLETED_CLASS: &str = "completed";

pub const ALL_COMPLETED_MARKUP: &str = r#"<p class="text-gray-500">All actions completed!</p>"#;
pub const COMPLETED_TOAST: &str = "Task completed successfully!";
pub const INIT_FAILED_MESSAGE: &str = "Failed to load dashboard";

const ACTION_ITEM_CLASSES: &str = "action-item p-3 mb-2 rounded-lg cursor-pointer hover:bg-gray-50";
const COMPLETED_TASK_CLASSES: &str =
    "completed-task flex justify-between items-center text-sm p-2 bg-gray-50 rounded";

const LOADING_MARKUP: &str = r#"<span class="flex items-center"><svg class="animate-spin -ml-1 mr-2 h-4 w-4 text-blue-500" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24"><circle class="opacity-25" cx="12" cy="12" r="10" stroke="currentColor" stroke-width="4"></circle><path class="opacity-75" fill="currentColor" d="M4 12a8 8 0 018-8V0C5.373 0 0 5.373 0 12h4zm2 5.291A7.962 7.962 0 014 12H0c0 3.042 1.135 5.824 3 7.938l3-2.647z"></path></svg>Completing...</span>"#;

const NO_DATA_MARKUP: &str = r#"<div class="text-center p-4 text-gray-500"><p>No test data available yet</p><p class="text-sm">Complete your first mental health test</p></div>"#;

/// Markup for one pending action item, shared with server-side rendering.
pub fn action_item_element(action_text: &str, state_context: &str, test_id: Option<&str>) -> Element {
    Element::new("div")
        .with_class(ACTION_ITEM_CLASSES)
        .with_data("action", action_text)
        .with_data("state", state_context)
        .with_data("test-id", test_id.unwrap_or_default())
        .with_markup(format!(
            r#"<div class="flex items-center"><span class="mr-2">📌</span><span>{}</span></div>"#,
            escape_html(action_text)
        ))
}

pub fn completed_task_element(task: &CompletedTask) -> Element {
    Element::new("div")
        .with_class(COMPLETED_TASK_CLASSES)
        .with_data("action", &task.action_text)
        .with_data("completed-at", &task.completed_at)
        .with_markup(format!(
            r#"<div class="flex items-center"><span class="text-green-500 mr-2">✓</span><span>{}</span></div><span class="text-gray-500 text-xs">{}</span>"#,
            escape_html(&task.action_text),
            escape_html(&task.completed_at)
        ))
}

/// A click that passed the guard and is waiting for the server.
#[derive(Debug, Clone)]
pub struct PendingCompletion {
    node: NodeId,
    original_markup: String,
    request: CompleteActionRequest,
    csrf_token: String,
}

impl PendingCompletion {
    pub fn request(&self) -> &CompleteActionRequest {
        &self.request
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

pub struct Dashboard<S: Surface, B: ChartBackend> {
    surface: S,
    registry: HandlerRegistry,
    chart: ChartController<B>,
    toaster: Toaster,
}

impl<S: Surface, B: ChartBackend> Dashboard<S, B> {
    pub fn new(surface: S, backend: B, toaster: Toaster) -> Self {
        Self {
            surface,
            registry: HandlerRegistry::new(),
            chart: ChartController::new(backend),
            toaster,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn chart(&self) -> &ChartController<B> {
        &self.chart
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Page load. Any failure swaps the chart area for an error block and
    /// reports `false`.
    pub fn initialize(&mut self) -> bool {
        match self.try_initialize() {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "dashboard initialization failed");
                self.show_error_state(INIT_FAILED_MESSAGE);
                false
            }
        }
    }

    fn try_initialize(&mut self) -> Result<(), PageError> {
        self.attach_handlers();
        self.initialize_chart()?;
        self.log_action_items();
        Ok(())
    }

    /// Gives every action item currently on the page exactly one click
    /// subscription and stamps its node id on it. Safe to call any number of
    /// times.
    pub fn attach_handlers(&mut self) -> usize {
        let items = self.surface.query_class(ACTION_ITEM_CLASS);
        for &node in &items {
            self.surface.set_data(node, NODE_DATA_KEY, &node.to_string());
        }
        let disposed = self.registry.rebind(items);
        if self.registry.is_empty() {
            debug!(disposed, "no action items to bind");
        } else {
            debug!(bound = self.registry.len(), disposed, "action item handlers attached");
        }
        self.registry.len()
    }

    /// Whether `node` is still on the page with a live click subscription.
    /// Node ids are never reused, so an id from a stale page stays unbound.
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.surface.contains(node) && self.registry.subscription(node).is_some()
    }

    pub fn initialize_chart(&mut self) -> Result<(), PageError> {
        let node = self
            .surface
            .element_by_id(SCORE_DATA_ID)
            .ok_or(PageError::MissingElement(SCORE_DATA_ID))?;
        let raw = self.surface.text(node).unwrap_or_default();
        let raw = if raw.trim().is_empty() { "{}" } else { raw.as_str() };
        let series: ScoreSeries = serde_json::from_str(raw)
            .map_err(|err| PageError::InvalidScoreData(err.to_string()))?;

        if series.is_empty() {
            self.show_no_data_message();
        } else {
            self.render_chart(&series);
        }
        Ok(())
    }

    /// Chart failures are logged and otherwise ignored.
    pub fn render_chart(&mut self, series: &ScoreSeries) {
        if let Err(err) = self.chart.render(&mut self.surface, series) {
            error!(error = %err, "chart rendering failed");
        }
    }

    pub fn show_no_data_message(&mut self) {
        self.chart.destroy(&mut self.surface);
        if let Some(container) = self.surface.first_by_class(CHART_CONTAINER_CLASS) {
            self.surface.set_inner_html(container, NO_DATA_MARKUP);
        }
    }

    pub fn show_error_state(&mut self, message: &str) {
        self.chart.destroy(&mut self.surface);
        let container = self
            .surface
            .first_by_class(CHART_CONTAINER_CLASS)
            .unwrap_or_else(|| self.surface.body());
        let markup = format!(
            r#"<div class="error-state p-4 bg-red-50 text-red-700 rounded-lg"><p class="font-medium">{}</p><button onclick="window.location.reload()" class="mt-2 px-3 py-1 bg-red-100 text-red-700 rounded text-sm">Reload Page</button></div>"#,
            escape_html(message)
        );
        self.surface.set_inner_html(container, &markup);
        self.attach_handlers();
    }

    pub fn log_action_items(&self) {
        let items = self.action_items();
        debug!(count = items.len(), "action items found");
        for (_, item) in &items {
            debug!(
                action = %item.action_text,
                state = %item.state_context,
                test_id = item.test_id.as_deref().unwrap_or(""),
                "action item"
            );
        }
    }

    /// Action item nodes on the page, in document order.
    pub fn action_nodes(&self) -> Vec<NodeId> {
        self.surface.query_class(ACTION_ITEM_CLASS)
    }

    pub fn action_items(&self) -> Vec<(NodeId, ActionItem)> {
        self.action_nodes()
            .into_iter()
            .filter_map(|node| self.read_item(node).map(|item| (node, item)))
            .collect()
    }

    fn read_item(&self, node: NodeId) -> Option<ActionItem> {
        if !self.surface.contains(node) {
            return None;
        }
        let display_state = if self.surface.has_class(node, COMPLETED_CLASS) {
            DisplayState::Completed
        } else if self.surface.has_class(node, PROCESSING_CLASS) {
            DisplayState::Processing
        } else {
            DisplayState::Pending
        };
        Some(ActionItem {
            action_text: self.surface.data(node, "action").unwrap_or_default(),
            state_context: self.surface.data(node, "state").unwrap_or_default(),
            test_id: self
                .surface
                .data(node, "test-id")
                .filter(|id| !id.is_empty()),
            display_state,
        })
    }

    /// Click on `node`. Only nodes holding a live subscription react, and
    /// items already processing or completed ignore the click.
    pub fn click(&mut self, node: NodeId) -> Option<PendingCompletion> {
        if !self.is_bound(node) {
            return None;
        }
        self.begin_completion(node)
    }

    fn begin_completion(&mut self, node: NodeId) -> Option<PendingCompletion> {
        let item = self.read_item(node)?;
        if item.display_state != DisplayState::Pending {
            debug!(action = %item.action_text, state = ?item.display_state, "click ignored");
            return None;
        }

        let original_markup = self.surface.inner_html(node)?;
        self.show_loading_state(node);
        info!(action = %item.action_text, "completing action");

        Some(PendingCompletion {
            node,
            original_markup,
            request: CompleteActionRequest {
                action_text: item.action_text,
                state_context: item.state_context,
                test_id: item.test_id,
            },
            csrf_token: csrf_token(&self.surface),
        })
    }

    /// Reconciles the page with the server's answer for `pending`.
    pub fn finish_completion(
        &mut self,
        pending: PendingCompletion,
        reply: Result<CompleteActionResponse, CompletionError>,
    ) -> Result<CompletedTask, CompletionError> {
        let action_text = pending.request.action_text.clone();
        let outcome = reply.and_then(|body| {
            if body.is_success() {
                Ok(body
                    .completed_action
                    .unwrap_or_else(|| CompletedTask::now(&action_text)))
            } else {
                Err(CompletionError::Rejected(body.error))
            }
        });

        match outcome {
            Ok(task) => {
                self.registry.release(pending.node);
                self.surface.remove(pending.node);
                self.add_completed_task(&task);
                self.toast(COMPLETED_TOAST, ToastKind::Success);
                info!(action = %task.action_text, completed_at = %task.completed_at, "action completed");
                Ok(task)
            }
            Err(err) => {
                warn!(action = %action_text, error = %err, "error completing action");
                self.reset_action_item(pending.node, &pending.original_markup);
                self.toast(&err.user_message(), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// Full click lifecycle against `transport`. `None` when the click was
    /// ignored.
    pub async fn on_action_click<T: CompletionTransport>(
        &mut self,
        node: NodeId,
        transport: &T,
    ) -> Option<Result<CompletedTask, CompletionError>> {
        let pending = self.click(node)?;
        let reply = transport
            .complete(pending.request(), pending.csrf_token())
            .await;
        Some(self.finish_completion(pending, reply))
    }

    /// Replaces the pending list with `actions` and rebinds click handlers.
    pub fn render_action_list(
        &mut self,
        actions: &[String],
        state_context: &str,
        test_id: Option<&str>,
    ) {
        let Some(container) = self.surface.first_by_class(ACTION_CONTAINER_CLASS) else {
            return;
        };
        self.surface.set_inner_html(container, "");
        self.surface.set_data(container, "state", state_context);
        self.surface
            .set_data(container, "test-id", test_id.unwrap_or_default());

        if actions.is_empty() {
            self.surface.set_inner_html(container, ALL_COMPLETED_MARKUP);
        } else {
            for action_text in actions {
                self.surface.append_child(
                    container,
                    action_item_element(action_text, state_context, test_id),
                );
            }
        }

        self.attach_handlers();
        self.log_action_items();
    }

    pub fn add_completed_task(&mut self, task: &CompletedTask) {
        if let Some(container) = self.surface.first_by_class(COMPLETED_CONTAINER_CLASS) {
            self.surface
                .prepend_child(container, completed_task_element(task));
        }
    }

    pub fn completed_tasks(&self) -> Vec<CompletedTask> {
        self.surface
            .query_class(COMPLETED_TASK_CLASS)
            .into_iter()
            .map(|node| CompletedTask {
                action_text: self.surface.data(node, "action").unwrap_or_default(),
                completed_at: self.surface.data(node, "completed-at").unwrap_or_default(),
            })
            .collect()
    }

    fn show_loading_state(&mut self, node: NodeId) {
        self.surface.set_inner_html(node, LOADING_MARKUP);
        self.surface.add_class(node, PROCESSING_CLASS);
    }

    fn reset_action_item(&mut self, node: NodeId, original_markup: &str) {
        self.surface.set_inner_html(node, original_markup);
        self.surface.remove_class(node, PROCESSING_CLASS);
    }

    pub fn toast(&mut self, message: &str, kind: ToastKind) {
        self.toaster
            .show(&mut self.surface, message, kind, Instant::now());
    }

    pub fn sweep_toasts(&mut self) {
        if self.toaster.is_empty() {
            return;
        }
        self.toaster.sweep(&mut self.surface, Instant::now());
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            pending: self
                .action_items()
                .into_iter()
                .map(|(node, item)| PendingItem { node, item })
                .collect(),
            completed: self.completed_tasks(),
            toasts: self.toaster.views(&self.surface),
            chart_rendered: self.chart.is_rendered(),
        }
    }
}
