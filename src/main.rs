use careconnect_ui::{AppState, Config, load_page_data, router};
use std::{net::SocketAddr, time::Duration};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const TOAST_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let page = load_page_data(&config.page_data_path).await;
    info!(
        actions = page.actions.len(),
        scores = page.scores.len(),
        path = %config.page_data_path.display(),
        "page data loaded"
    );

    let state = AppState::new(&config, page)?;

    let dashboard = state.dashboard.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TOAST_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            dashboard.lock().await.sweep_toasts();
        }
    });

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!(
        completion_endpoint = %config.complete_action_base_url,
        "listening on http://{addr}"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
