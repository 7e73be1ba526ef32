pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;

use tracing::info;

use crate::config::WebConfig;
use state::AppState;

/// Binds the listener and serves the application router until ctrl-c.
pub async fn run_server(config: WebConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = routes::router().with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    // If installing the handler fails there is no signal to wait for, so
    // pending() keeps the server running instead of exiting immediately.
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(_) => std::future::pending().await,
    }
}
