//! # Expense Tracker Backend
//!
//! Non-UI core of the expense tracker: persistence on the device or in a
//! per-user remote store, one-shot sync between the two, category management
//! and spending statistics.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (session, repositories, sync, statistics)
//!     ↓
//! Storage Layer (local JSON documents, remote SQL store)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::ExpenseSession;
use crate::storage::{LocalConnection, RemoteConnection, StorageBackends};

/// Main application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<ExpenseSession>>,
}

impl AppState {
    pub fn new(session: ExpenseSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}

/// Open both storage backends and restore the session
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up local storage in {}", config.data_dir.display());
    let local = LocalConnection::new(&config.data_dir)?;

    let remote = match config.remote_url.as_deref() {
        Some(url) => match RemoteConnection::new(url).await {
            Ok(connection) => {
                info!("Connected to remote storage");
                Some(connection)
            }
            Err(e) => {
                error!("Remote storage unavailable, continuing locally: {:#}", e);
                None
            }
        },
        None => {
            info!("No remote storage configured");
            None
        }
    };

    info!("Setting up session");
    let session = ExpenseSession::open(StorageBackends::new(local, remote)).await;
    Ok(AppState::new(session))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let origin = config.cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        warn!("Invalid CORS origin '{}', using the default", config.cors_origin);
        HeaderValue::from_static("http://localhost:8080")
    });

    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let router = Router::new().nest("/api", io::rest::api_router());
    let router = match &config.static_dir {
        Some(dir) => {
            info!("Serving frontend from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router.layer(cors).with_state(app_state)
}
