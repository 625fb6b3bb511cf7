use axum::{routing::get, Router};
use playback_core::ResolvedConfig;
use playback_storage::{open_content_db_readonly, SqliteCourseContentRepository};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod http;
mod protocol;
mod sim_audio;
mod state;
mod websocket;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    tracing::info!("starting playback headless test server");

    let content_db_path =
        std::env::var("CONTENT_DB_PATH").unwrap_or_else(|_| "data/content.db".to_string());
    tracing::info!(content_db_path, "opening course content database");

    let pool = open_content_db_readonly(&content_db_path).await?;
    let repo = Arc::new(SqliteCourseContentRepository::new(pool));

    let app_state = Arc::new(AppState::new(repo, ResolvedConfig::default()));

    let app = Router::new()
        .merge(http::create_http_router())
        .route("/ws", get(websocket::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    tracing::info!(addr, "listening");
    tracing::info!("websocket endpoint: ws://{addr}/ws");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
