use crate::chart::CHART_CANVAS_ID;
use crate::dashboard::{
    ACTION_CONTAINER_CLASS, ALL_COMPLETED_MARKUP, CHART_CONTAINER_CLASS,
    COMPLETED_CONTAINER_CLASS, SCORE_DATA_ID, action_item_element, completed_task_element,
};
use crate::models::PageData;
use crate::surface::{Document, Element, Surface, escape_html};
use crate::timer::{START_BUTTON_ID, STATUS_ID, STOP_BUTTON_ID, TIMER_ID, elapsed_text};
use crate::transport::CSRF_FIELD;

/// Server-rendered dashboard markup for `page`.
pub fn dashboard_document(page: &PageData, csrf_token: Option<&str>) -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    if let Some(token) = csrf_token {
        doc.set_cookie(format!("csrftoken={token}"));
        doc.append_child(
            body,
            Element::new("input")
                .with_attr("type", "hidden")
                .with_attr("name", CSRF_FIELD)
                .with_attr("value", token),
        );
    }

    let score_json = serde_json::to_string(&page.score_series())
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c");
    doc.append_child(
        body,
        Element::new("script")
            .with_id(SCORE_DATA_ID)
            .with_attr("type", "application/json")
            .with_markup(score_json),
    );

    if let Some(card) = doc.append_child(body, section("Mental health score")) {
        if let Some(chart) = doc.append_child(card, Element::new("div").with_class(CHART_CONTAINER_CLASS)) {
            doc.append_child(chart, Element::new("div").with_id(CHART_CANVAS_ID));
        }
    }

    if let Some(card) = doc.append_child(body, section("Action items")) {
        if let Some(list) = doc.append_child(
            card,
            Element::new("div")
                .with_class(ACTION_CONTAINER_CLASS)
                .with_data("state", &page.state_context)
                .with_data("test-id", page.test_id.as_deref().unwrap_or_default()),
        ) {
            if page.actions.is_empty() {
                doc.set_inner_html(list, ALL_COMPLETED_MARKUP);
            }
            for action in &page.actions {
                doc.append_child(
                    list,
                    action_item_element(action, &page.state_context, page.test_id.as_deref()),
                );
            }
        }
    }

    if let Some(card) = doc.append_child(body, section("Completed")) {
        if let Some(done) =
            doc.append_child(card, Element::new("div").with_class(COMPLETED_CONTAINER_CLASS))
        {
            for task in &page.completed {
                doc.append_child(done, completed_task_element(task));
            }
        }
    }

    doc
}

pub fn meditation_document() -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    if let Some(card) = doc.append_child(body, section("Meditation")) {
        doc.append_child(
            card,
            Element::new("p")
                .with_id(STATUS_ID)
                .with_class("status")
                .with_text("Press start when you are ready."),
        );
        doc.append_child(
            card,
            Element::new("p")
                .with_id(TIMER_ID)
                .with_class("timer")
                .with_text(&elapsed_text(0)),
        );
        for (id, action, label) in [
            (START_BUTTON_ID, "/meditation/start", "Start"),
            (STOP_BUTTON_ID, "/meditation/stop", "Stop"),
        ] {
            if let Some(form) = doc.append_child(
                card,
                Element::new("form")
                    .with_attr("method", "post")
                    .with_attr("action", action),
            ) {
                doc.append_child(
                    form,
                    Element::new("button")
                        .with_id(id)
                        .with_attr("type", "submit")
                        .with_text(label),
                );
            }
        }
    }
    doc
}

fn section(title: &str) -> Element {
    Element::new("section")
        .with_class("card")
        .with_markup(format!("<h2>{}</h2>", escape_html(title)))
}

pub fn render_dashboard_page(body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", "Mental Health Dashboard")
        .replace("{{SCRIPT}}", DASHBOARD_SCRIPT)
        .replace("{{BODY}}", body)
}

pub fn render_meditation_page(body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", "Meditation")
        .replace("{{SCRIPT}}", MEDITATION_SCRIPT)
        .replace("{{BODY}}", body)
}

const DASHBOARD_SCRIPT: &str = r#"
    document.querySelectorAll('.action-item').forEach((item) => {
      item.addEventListener('click', () => {
        if (item.classList.contains('processing')) {
          return;
        }
        item.classList.add('processing');
        fetch(`/users/dashboard/actions/${item.dataset.node}`, { method: 'POST' })
          .finally(() => window.location.reload());
      });
    });
    if (document.querySelector('.toast')) {
      setTimeout(() => window.location.reload(), 3500);
    }
"#;

const MEDITATION_SCRIPT: &str = r#"
    const statusEl = document.getElementById('status');
    const timerEl = document.getElementById('timer');
    const poll = async () => {
      const res = await fetch('/api/meditation');
      if (!res.ok) {
        return;
      }
      const snapshot = await res.json();
      statusEl.textContent = snapshot.status;
      timerEl.textContent = snapshot.display;
    };
    setInterval(() => poll().catch(() => {}), 1000);
"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f3f6fb;
      --ink: #1f2937;
      --muted: #6b7280;
      --accent: #3b82f6;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(31, 41, 55, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      gap: 20px;
      justify-content: center;
      grid-template-columns: min(760px, 100%);
      padding: 32px 18px 48px;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    h2 {
      margin: 0 0 16px;
      font-size: 1.1rem;
    }

    .chart-container svg {
      width: 100%;
      height: 260px;
    }

    .chart-grid {
      stroke: rgba(31, 41, 55, 0.08);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-point {
      fill: var(--accent);
    }

    .chart-line {
      stroke-width: 3;
    }

    .action-item {
      padding: 12px;
      margin-bottom: 8px;
      border-radius: 10px;
      cursor: pointer;
    }

    .action-item:hover {
      background: var(--bg);
    }

    .action-item.processing {
      opacity: 0.6;
      cursor: progress;
    }

    .completed-task {
      display: flex;
      justify-content: space-between;
      font-size: 0.9rem;
      padding: 8px;
      background: var(--bg);
      border-radius: 8px;
      margin-bottom: 6px;
    }

    .timer {
      font-size: 2rem;
      font-weight: 600;
    }

    .toast {
      position: fixed;
      right: 24px;
      bottom: 24px;
      padding: 12px 18px;
      border-radius: 12px;
      color: white;
      background: var(--ink);
      transition: opacity 300ms ease, transform 300ms ease;
    }

    .toast.success {
      background: #16a34a;
    }

    .toast.error {
      background: #dc2626;
    }

    .toast.animate__fadeOutDown {
      opacity: 0;
      transform: translateY(12px);
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-weight: 600;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }
  </style>
</head>
<body>
{{BODY}}
  <script>{{SCRIPT}}</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletedTask;

    #[test]
    fn dashboard_document_carries_page_data() {
        let page = PageData {
            scores: vec![10.0],
            dates: vec!["Oct 11".into()],
            actions: vec!["Take a walk".into(), "Call a friend".into()],
            state_context: "moderate".into(),
            test_id: Some("3".into()),
            completed: vec![CompletedTask {
                action_text: "Journal".into(),
                completed_at: "Oct 10, 2026 08:00".into(),
            }],
        };
        let doc = dashboard_document(&page, Some("tok"));

        assert_eq!(doc.query_class("action-item").len(), 2);
        assert_eq!(doc.query_class("completed-task").len(), 1);
        assert_eq!(doc.input_value(CSRF_FIELD).as_deref(), Some("tok"));
        let data = doc.element_by_id(SCORE_DATA_ID).unwrap();
        assert_eq!(
            doc.text(data).unwrap(),
            r#"{"scores":[10.0],"dates":["Oct 11"]}"#
        );
        assert!(doc.element_by_id(CHART_CANVAS_ID).is_some());
    }

    #[test]
    fn empty_action_list_renders_all_completed() {
        let doc = dashboard_document(&PageData::default(), None);
        let list = doc.first_by_class(ACTION_CONTAINER_CLASS).unwrap();
        assert_eq!(doc.inner_html(list).unwrap(), ALL_COMPLETED_MARKUP);
        assert_eq!(doc.input_value(CSRF_FIELD), None);
    }

    #[test]
    fn meditation_document_has_timer_controls() {
        let doc = meditation_document();
        for id in [START_BUTTON_ID, STOP_BUTTON_ID, STATUS_ID, TIMER_ID] {
            assert!(doc.element_by_id(id).is_some(), "missing {id}");
        }
        let html = render_meditation_page(&doc.render_body());
        assert!(html.contains("Time: 0 sec"));
        assert!(html.contains("/meditation/start"));
    }
}
