use crate::chart::SvgLineChart;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::errors::PageError;
use crate::models::PageData;
use crate::surface::Document;
use crate::timer::TimerWidget;
use crate::toast::Toaster;
use crate::transport::HttpTransport;
use crate::ui::{dashboard_document, meditation_document};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type DashboardPage = Dashboard<Document, SvgLineChart>;
pub type MeditationTimer = TimerWidget<Document>;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Mutex<DashboardPage>>,
    pub meditation: Arc<Mutex<MeditationTimer>>,
    pub transport: HttpTransport,
}

impl AppState {
    /// Builds both pages and runs their load-time setup. Must be called from
    /// within a tokio runtime.
    pub fn new(config: &Config, page: PageData) -> Result<Self, PageError> {
        let document = dashboard_document(&page, config.csrf_token.as_deref());
        let toaster = Toaster::new(config.toast_display, config.toast_removal);
        let mut dashboard = Dashboard::new(document, SvgLineChart, toaster);
        dashboard.initialize();

        let meditation = TimerWidget::mount(meditation_document(), config.tick_interval)?;

        Ok(Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            meditation: Arc::new(Mutex::new(meditation)),
            transport: HttpTransport::new(&config.complete_action_base_url),
        })
    }
}
