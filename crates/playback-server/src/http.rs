use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

pub fn create_http_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
