use crate::models::ToastView;
use crate::surface::{Element, NodeId, Surface};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub const TOAST_CLASS: &str = "toast";
const LEAVING_CLASS: &str = "animate__fadeOutDown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug)]
struct ActiveToast {
    node: NodeId,
    shown_at: Instant,
    leaving: bool,
}

/// Self-dismissing notifications appended to the page body.
///
/// Dismissal is driven by [`Toaster::sweep`]: once `display` has elapsed the
/// toast gets its exit animation class, and `removal` later it leaves the page.
#[derive(Debug)]
pub struct Toaster {
    display: Duration,
    removal: Duration,
    active: Vec<ActiveToast>,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000), Duration::from_millis(300))
    }
}

impl Toaster {
    pub fn new(display: Duration, removal: Duration) -> Self {
        Self {
            display,
            removal,
            active: Vec::new(),
        }
    }

    pub fn show<S: Surface>(
        &mut self,
        surface: &mut S,
        message: &str,
        kind: ToastKind,
        now: Instant,
    ) -> Option<NodeId> {
        let element = Element::new("div")
            .with_class(TOAST_CLASS)
            .with_class(kind.as_str())
            .with_class("animate__animated animate__fadeInUp")
            .with_data("kind", kind.as_str())
            .with_text(message);
        let body = surface.body();
        let node = surface.append_child(body, element)?;
        self.active.push(ActiveToast {
            node,
            shown_at: now,
            leaving: false,
        });
        Some(node)
    }

    pub fn sweep<S: Surface>(&mut self, surface: &mut S, now: Instant) {
        let (display, removal) = (self.display, self.removal);
        self.active.retain_mut(|toast| {
            let age = now.saturating_duration_since(toast.shown_at);
            if age >= display + removal {
                surface.remove(toast.node);
                return false;
            }
            if age >= display && !toast.leaving {
                surface.add_class(toast.node, LEAVING_CLASS);
                toast.leaving = true;
            }
            true
        });
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn views<S: Surface>(&self, surface: &S) -> Vec<ToastView> {
        self.active
            .iter()
            .map(|toast| ToastView {
                kind: surface.data(toast.node, "kind").unwrap_or_default(),
                message: surface.text(toast.node).unwrap_or_default(),
                leaving: toast.leaving,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Document;

    #[test]
    fn toast_fades_then_leaves() {
        let mut doc = Document::new();
        let mut toaster = Toaster::default();
        let start = Instant::now();
        let node = toaster
            .show(&mut doc, "Task completed successfully!", ToastKind::Success, start)
            .unwrap();
        assert!(doc.has_class(node, "success"));
        assert!(doc.has_class(node, "animate__fadeInUp"));

        toaster.sweep(&mut doc, start + Duration::from_millis(2_999));
        assert!(!doc.has_class(node, LEAVING_CLASS));

        toaster.sweep(&mut doc, start + Duration::from_millis(3_000));
        assert!(doc.has_class(node, LEAVING_CLASS));
        assert!(toaster.views(&doc)[0].leaving);

        toaster.sweep(&mut doc, start + Duration::from_millis(3_299));
        assert!(doc.contains(node));

        toaster.sweep(&mut doc, start + Duration::from_millis(3_300));
        assert!(!doc.contains(node));
        assert!(toaster.is_empty());
    }

    #[test]
    fn views_report_message_and_kind() {
        let mut doc = Document::new();
        let mut toaster = Toaster::default();
        toaster.show(&mut doc, "Invalid <request>", ToastKind::Error, Instant::now());
        let views = toaster.views(&doc);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].kind, "error");
        assert_eq!(views[0].message, "Invalid <request>");
    }
}
