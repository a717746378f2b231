//! # REST API Interface Layer
//!
//! HTTP endpoints through which a frontend drives the expense session. Each
//! `*_apis` module exposes a `router()` that is merged under `/api`.
//!
//! Handlers translate domain errors into status codes with a JSON body of the
//! form `{ "error": "..." }`:
//!
//! | Error | Status |
//! |---|---|
//! | duplicate category | 409 |
//! | category or expense not found | 404 |
//! | invalid import document | 422 |
//! | wrong mode, not signed in, remote unavailable | 412 |
//! | nothing to sync, invalid input | 400 |
//! | backend failure | 502 |

pub mod category_apis;
pub mod expense_apis;
pub mod session_apis;
pub mod sync_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use shared::ErrorResponse;
use tracing::{error, info, warn};

use crate::domain::DomainError;
use crate::AppState;

/// All API routes, to be nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(session_apis::router())
        .merge(expense_apis::router())
        .merge(category_apis::router())
        .merge(sync_apis::router())
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::DuplicateCategory(_) => StatusCode::CONFLICT,
        DomainError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidImportFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::WrongMode(_) | DomainError::NotSignedIn | DomainError::RemoteUnavailable => {
            StatusCode::PRECONDITION_FAILED
        }
        DomainError::NothingToSync(_) => StatusCode::BAD_REQUEST,
        DomainError::Storage(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Convert a domain error into an HTTP response
pub fn domain_error(error: DomainError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!("Storage error: {:#}", error);
    } else if error.is_precondition() {
        info!("Precondition not met ({}): {}", status, error);
    } else {
        warn!("Request rejected ({}): {}", status, error);
    }
    error_response(status, error.to_string())
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}
