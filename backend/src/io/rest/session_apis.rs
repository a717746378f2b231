use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{SetStorageModeRequest, SignInRequest, StorageModeResponse};
use tracing::info;

use super::error_response;
use crate::AppState;

/// Create a router for session and storage mode APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session).put(sign_in).delete(sign_out))
        .route(
            "/storage-mode",
            get(get_storage_mode).put(set_storage_mode),
        )
}

async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, Json(session.describe())).into_response()
}

/// Accept the user id handed over by the auth collaborator
async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> impl IntoResponse {
    info!("PUT /api/session");
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "user_id must not be empty");
    }

    let mut session = state.session.lock().await;
    session.sign_in(user_id).await;
    (StatusCode::OK, Json(session.describe())).into_response()
}

async fn sign_out(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/session");
    let mut session = state.session.lock().await;
    session.sign_out().await;
    (StatusCode::OK, Json(session.describe())).into_response()
}

async fn get_storage_mode(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let response = StorageModeResponse {
        storage_mode: session.storage_mode(),
        remote_available: session.remote_available(),
        changed: false,
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn set_storage_mode(
    State(state): State<AppState>,
    Json(request): Json<SetStorageModeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/storage-mode - {}", request.mode);
    let mut session = state.session.lock().await;
    let previous = session.storage_mode();
    let accepted = session.set_storage_mode(request.mode).await;

    let response = StorageModeResponse {
        storage_mode: session.storage_mode(),
        remote_available: session.remote_available(),
        changed: accepted && previous != request.mode,
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_for, send};
    use crate::storage::test_utils::TestEnvironment;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let app = app_for(&env).await;

        let (status, body) = send(&app, Method::GET, "/api/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], json!(null));
        assert_eq!(body["using_remote"], json!(false));

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/session",
            Some(json!({ "user_id": "user-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "user-1");
        assert_eq!(body["storage_mode"], "remote");
        assert_eq!(body["using_remote"], json!(true));

        let (_, body) = send(&app, Method::DELETE, "/api/session", None).await;
        assert_eq!(body["user_id"], json!(null));
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/session",
            Some(json!({ "user_id": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_remote_mode_refused_without_remote() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/storage-mode",
            Some(json!({ "mode": "remote" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage_mode"], "local");
        assert_eq!(body["changed"], json!(false));
        assert_eq!(body["remote_available"], json!(false));
    }

    #[tokio::test]
    async fn test_switch_mode() {
        let env = TestEnvironment::with_remote().await.unwrap();
        let app = app_for(&env).await;

        let (_, body) = send(
            &app,
            Method::PUT,
            "/api/storage-mode",
            Some(json!({ "mode": "local" })),
        )
        .await;
        assert_eq!(body["storage_mode"], "local");
        assert_eq!(body["changed"], json!(true));

        let (_, body) = send(&app, Method::GET, "/api/storage-mode", None).await;
        assert_eq!(body["storage_mode"], "local");
    }
}
