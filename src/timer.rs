//! Meditation stopwatch.

use crate::errors::PageError;
use crate::models::TimerSnapshot;
use crate::surface::{NodeId, Surface};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

pub const START_BUTTON_ID: &str = "startButton";
pub const STOP_BUTTON_ID: &str = "stopButton";
pub const STATUS_ID: &str = "status";
pub const TIMER_ID: &str = "timer";

pub const STARTED_STATUS: &str = "Meditation session started!";
pub const STOPPED_STATUS: &str = "Meditation session stopped!";

pub fn elapsed_text(seconds: u64) -> String {
    format!("Time: {seconds} sec")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTimer {
    running: bool,
    elapsed_seconds: u64,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.elapsed_seconds = 0;
        self.running = true;
    }

    /// Counts one second while running.
    pub fn tick(&mut self) -> u64 {
        if self.running {
            self.elapsed_seconds += 1;
        }
        self.elapsed_seconds
    }

    /// Returns the length of the session that just ended.
    pub fn stop(&mut self) -> u64 {
        self.running = false;
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }
}

struct Mounted<S> {
    timer: SessionTimer,
    surface: S,
    status: NodeId,
    display: NodeId,
}

impl<S: Surface> Mounted<S> {
    fn tick(&mut self) {
        let seconds = self.timer.tick();
        self.surface.set_text(self.display, &elapsed_text(seconds));
        debug!(seconds, "timer tick");
    }
}

/// A [`SessionTimer`] wired to a page and driven by a tokio interval.
///
/// At most one tick schedule exists at a time; starting again cancels the
/// previous one before scheduling a fresh one. Dropping the widget cancels it
/// too.
pub struct TimerWidget<S> {
    mounted: Arc<Mutex<Mounted<S>>>,
    period: Duration,
    schedule: Option<JoinHandle<()>>,
}

impl<S: Surface + Send + 'static> TimerWidget<S> {
    pub fn mount(surface: S, period: Duration) -> Result<Self, PageError> {
        for id in [START_BUTTON_ID, STOP_BUTTON_ID] {
            if surface.element_by_id(id).is_none() {
                return Err(PageError::MissingElement(id));
            }
        }
        let status = surface
            .element_by_id(STATUS_ID)
            .ok_or(PageError::MissingElement(STATUS_ID))?;
        let display = surface
            .element_by_id(TIMER_ID)
            .ok_or(PageError::MissingElement(TIMER_ID))?;

        Ok(Self {
            mounted: Arc::new(Mutex::new(Mounted {
                timer: SessionTimer::new(),
                surface,
                status,
                display,
            })),
            period,
            schedule: None,
        })
    }

    pub async fn start(&mut self) {
        self.cancel_schedule();
        {
            let mut mounted = self.mounted.lock().await;
            mounted.timer.start();
            let status = mounted.status;
            mounted.surface.set_text(status, STARTED_STATUS);
        }

        let mounted = Arc::clone(&self.mounted);
        let period = self.period;
        self.schedule = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                mounted.lock().await.tick();
            }
        }));
        info!("meditation session started");
    }

    pub async fn stop(&mut self) -> u64 {
        self.cancel_schedule();
        let mut mounted = self.mounted.lock().await;
        let elapsed = mounted.timer.stop();
        let status = mounted.status;
        mounted.surface.set_text(status, STOPPED_STATUS);
        info!(elapsed_seconds = elapsed, "meditation session stopped");
        elapsed
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let mounted = self.mounted.lock().await;
        TimerSnapshot {
            running: mounted.timer.is_running(),
            elapsed_seconds: mounted.timer.elapsed_seconds(),
            display: mounted.surface.text(mounted.display).unwrap_or_default(),
            status: mounted.surface.text(mounted.status).unwrap_or_default(),
        }
    }

    pub async fn with_surface<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let mounted = self.mounted.lock().await;
        read(&mounted.surface)
    }
}

impl<S> TimerWidget<S> {
    fn cancel_schedule(&mut self) {
        if let Some(handle) = self.schedule.take() {
            handle.abort();
        }
    }
}

impl<S> Drop for TimerWidget<S> {
    fn drop(&mut self) {
        self.cancel_schedule();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Document, Element};
    use tokio::time::sleep;

    fn page() -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_child(body, Element::new("button").with_id(START_BUTTON_ID));
        doc.append_child(body, Element::new("button").with_id(STOP_BUTTON_ID));
        doc.append_child(body, Element::new("p").with_id(STATUS_ID));
        doc.append_child(body, Element::new("p").with_id(TIMER_ID).with_text("Time: 0 sec"));
        doc
    }

    #[test]
    fn session_timer_counts_only_while_running() {
        let mut timer = SessionTimer::new();
        assert_eq!(timer.tick(), 0);
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.stop(), 2);
        assert_eq!(timer.tick(), 2);
        timer.start();
        assert_eq!(timer.elapsed_seconds(), 0);
        assert!(timer.is_running());
    }

    #[test]
    fn mount_requires_timer_elements() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_child(body, Element::new("button").with_id(START_BUTTON_ID));
        doc.append_child(body, Element::new("button").with_id(STOP_BUTTON_ID));
        doc.append_child(body, Element::new("p").with_id(STATUS_ID));
        let err = TimerWidget::mount(doc, Duration::from_secs(1)).err();
        assert_eq!(err, Some(PageError::MissingElement(TIMER_ID)));
    }

    #[tokio::test(start_paused = true)]
    async fn display_tracks_ticks_since_start() {
        let mut widget = TimerWidget::mount(page(), Duration::from_secs(1)).unwrap();
        widget.start().await;
        sleep(Duration::from_millis(3_500)).await;

        let snapshot = widget.snapshot().await;
        assert!(snapshot.running);
        assert_eq!(snapshot.elapsed_seconds, 3);
        assert_eq!(snapshot.display, "Time: 3 sec");
        assert_eq!(snapshot.status, STARTED_STATUS);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_resets_and_keeps_one_schedule() {
        let mut widget = TimerWidget::mount(page(), Duration::from_secs(1)).unwrap();
        widget.start().await;
        sleep(Duration::from_millis(2_500)).await;
        widget.start().await;
        sleep(Duration::from_millis(2_100)).await;

        let snapshot = widget.snapshot().await;
        assert_eq!(snapshot.elapsed_seconds, 2);
        assert_eq!(snapshot.display, "Time: 2 sec");
        assert!(widget.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_ticks() {
        let mut widget = TimerWidget::mount(page(), Duration::from_secs(1)).unwrap();
        widget.start().await;
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(widget.stop().await, 1);
        sleep(Duration::from_secs(5)).await;

        let snapshot = widget.snapshot().await;
        assert!(!snapshot.running);
        assert_eq!(snapshot.elapsed_seconds, 1);
        assert_eq!(snapshot.display, "Time: 1 sec");
        assert_eq!(snapshot.status, STOPPED_STATUS);
        assert!(!widget.is_scheduled());
    }
}
