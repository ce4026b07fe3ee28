pub mod app;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod state;
pub mod storage;
pub mod surface;
pub mod timer;
pub mod toast;
pub mod transport;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use dashboard::Dashboard;
pub use state::AppState;
pub use storage::load_page_data;
pub use surface::{Document, Surface};
