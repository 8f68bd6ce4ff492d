use pushreg_backend::{build_app, AppState, BackendError};
use pushreg_common::logging;
use pushreg_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), BackendError> {
    logging::init();

    let config = Arc::new(load_config()?);
    let state = logging::log_result(
        AppState::new(config.clone()).await,
        "Token registry service ready",
        "Failed to start token registry service",
    )?;
    let _sweeper = state.spawn_sweeper();

    let app = build_app(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting push token registry at http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
