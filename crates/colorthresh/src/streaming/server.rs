use super::routes::{
    cycle_handler, get_state_handler, quit_handler, set_bound_handler, stream_converted,
    stream_mask,
};
use super::state::AppState;
use super::ui::index_page;
use axum::routing::{get, post};
use std::net::SocketAddr;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(index_page))
        .route("/state", get(get_state_handler))
        .route("/bound", post(set_bound_handler))
        .route("/cycle", post(cycle_handler))
        .route("/quit", post(quit_handler))
        .route("/stream/converted", get(stream_converted))
        .route("/stream/mask", get(stream_mask))
        .with_state(state)
}

/// Binds the dashboard port and serves it in the background.
pub async fn run_dashboard_server(port: u16, state: AppState) -> anyhow::Result<SocketAddr> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Dashboard listening on http://{}", local);

    let app = router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Serving error: {}", e)
        }
    });

    Ok(local)
}
