use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use shared::{CategoryListResponse, CategoryResponse, NewCategory, ReorderCategoriesRequest};
use tracing::info;

use super::{domain_error, error_response};
use crate::AppState;

/// Create a router for category APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(add_category))
        .route("/categories/order", put(reorder_categories))
        .route("/categories/reset", post(reset_categories))
        .route("/categories/:key", delete(delete_category))
        .route("/categories/:key/default", put(set_default_category))
}

fn list_response(categories: &[shared::Category]) -> Json<CategoryListResponse> {
    Json(CategoryListResponse {
        categories: categories.to_vec(),
    })
}

async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, list_response(session.categories().categories())).into_response()
}

async fn add_category(
    State(state): State<AppState>,
    Json(request): Json<NewCategory>,
) -> impl IntoResponse {
    info!("POST /api/categories - {}", request.name);
    if request.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Category name must not be empty");
    }

    let mut session = state.session.lock().await;
    match session.categories_mut().add(&request).await {
        Ok(category) => (
            StatusCode::CREATED,
            Json(CategoryResponse {
                success_message: format!("Category \"{}\" added", category.name),
                category,
            }),
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

/// Delete by id or, for id-less categories, by name
async fn delete_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/categories/{}", key);
    let mut session = state.session.lock().await;
    match session.categories_mut().delete(&key).await {
        Ok(category) => (
            StatusCode::OK,
            Json(CategoryResponse {
                success_message: format!("Category \"{}\" deleted", category.name),
                category,
            }),
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

async fn reorder_categories(
    State(state): State<AppState>,
    Json(request): Json<ReorderCategoriesRequest>,
) -> impl IntoResponse {
    info!("PUT /api/categories/order - {} keys", request.order.len());
    let mut session = state.session.lock().await;
    match session.categories_mut().reorder_by_keys(&request.order).await {
        Ok(categories) => (StatusCode::OK, list_response(categories)).into_response(),
        Err(e) => domain_error(e),
    }
}

async fn set_default_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    info!("PUT /api/categories/{}/default", key);
    let mut session = state.session.lock().await;
    match session.categories_mut().set_default(&key).await {
        Ok(category) => (
            StatusCode::OK,
            Json(CategoryResponse {
                success_message: format!("\"{}\" is now the default category", category.name),
                category,
            }),
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

async fn reset_categories(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/categories/reset");
    let mut session = state.session.lock().await;
    match session.categories_mut().reset_to_defaults().await {
        Ok(categories) => (StatusCode::OK, list_response(categories)).into_response(),
        Err(e) => domain_error(e),
    }
}
