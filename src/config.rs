use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Origin of the server that owns `/users/complete-action/`.
    pub complete_action_base_url: String,
    pub page_data_path: PathBuf,
    pub csrf_token: Option<String>,
    pub tick_interval: Duration,
    pub toast_display: Duration,
    pub toast_removal: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            complete_action_base_url: "http://127.0.0.1:8000".to_string(),
            page_data_path: PathBuf::from("data/dashboard.json"),
            csrf_token: None,
            tick_interval: Duration::from_millis(1000),
            toast_display: Duration::from_millis(3000),
            toast_removal: Duration::from_millis(300),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT").unwrap_or(defaults.port),
            complete_action_base_url: env::var("COMPLETE_ACTION_BASE_URL")
                .unwrap_or(defaults.complete_action_base_url),
            page_data_path: env::var("PAGE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.page_data_path),
            csrf_token: env::var("CSRF_TOKEN").ok().filter(|token| !token.is_empty()),
            tick_interval: millis("TICK_INTERVAL_MS").unwrap_or(defaults.tick_interval),
            toast_display: millis("TOAST_DISPLAY_MS").unwrap_or(defaults.toast_display),
            toast_removal: millis("TOAST_REMOVAL_MS").unwrap_or(defaults.toast_removal),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

fn millis(key: &str) -> Option<Duration> {
    parsed::<u64>(key)
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
