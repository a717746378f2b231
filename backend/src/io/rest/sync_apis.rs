use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use tracing::info;

use super::domain_error;
use crate::AppState;

/// Create a router for the one-shot sync APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync/local-to-remote", post(sync_local_to_remote))
        .route("/sync/remote-to-local", post(sync_remote_to_local))
}

async fn sync_local_to_remote(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/sync/local-to-remote");
    let mut session = state.session.lock().await;
    match session.sync_local_to_remote().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => domain_error(e),
    }
}

async fn sync_remote_to_local(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/sync/remote-to-local");
    let mut session = state.session.lock().await;
    match session.sync_remote_to_local().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => domain_error(e),
    }
}
