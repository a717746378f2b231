use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use shared::{
    DateRange, ExpenseFilters, ExpenseListResponse, ExpenseResponse, ExpenseUpdate,
    ImportResponse, MonthsResponse, NewExpense, SortKey, SortOrder, StatisticsResponse,
    SuccessResponse,
};
use tracing::info;

use super::{domain_error, error_response};
use crate::domain::statistics;
use crate::AppState;

/// Query parameters for the expense list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    pub month: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<SortKey>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

/// Create a router for expense, statistics and snapshot APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/expenses",
            get(list_expenses).post(create_expense).delete(clear_expenses),
        )
        .route("/expenses/export", get(export_expenses))
        .route("/expenses/import", post(import_expenses))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
        .route("/statistics", get(get_statistics))
        .route("/months", get(get_months))
}

fn valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> impl IntoResponse {
    info!("GET /api/expenses - query: {:?}", query);
    let session = state.session.lock().await;

    let filters = ExpenseFilters {
        category: query.category,
        date_range: DateRange {
            start: query.start_date,
            end: query.end_date,
        },
        search_term: query.search.unwrap_or_default(),
    };
    let expenses = statistics::filter_by_month(session.expenses().expenses(), query.month.as_deref());
    let mut expenses = statistics::apply_filters(&expenses, &filters);
    if let Some(sort_by) = query.sort_by {
        expenses = statistics::sort_expenses(&expenses, sort_by, query.order.unwrap_or_default());
    }

    (StatusCode::OK, Json(ExpenseListResponse { expenses })).into_response()
}

async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<NewExpense>,
) -> impl IntoResponse {
    info!("POST /api/expenses - {} {}", request.amount, request.category);
    if !valid_amount(request.amount) {
        return error_response(StatusCode::BAD_REQUEST, "Amount must be greater than zero");
    }

    let mut session = state.session.lock().await;
    match session.expenses_mut().add_expense(&request).await {
        Ok(expense) => (
            StatusCode::CREATED,
            Json(ExpenseResponse {
                expense,
                success_message: "Expense added successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ExpenseUpdate>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{}", id);
    if update.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No fields to update");
    }
    if update.amount.is_some_and(|amount| !valid_amount(amount)) {
        return error_response(StatusCode::BAD_REQUEST, "Amount must be greater than zero");
    }

    let mut session = state.session.lock().await;
    match session.expenses_mut().update_expense(&id, &update).await {
        Ok(Some(expense)) => (
            StatusCode::OK,
            Json(ExpenseResponse {
                expense,
                success_message: "Expense updated successfully".to_string(),
            }),
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("Expense {} not found", id)),
        Err(e) => domain_error(e),
    }
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", id);
    let mut session = state.session.lock().await;
    match session.expenses_mut().delete_expense(&id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success_message: "Expense deleted".to_string(),
            }),
        )
            .into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, format!("Expense {} not found", id)),
        Err(e) => domain_error(e),
    }
}

async fn clear_expenses(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/expenses");
    let mut session = state.session.lock().await;
    match session.expenses_mut().clear_all().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse {
                success_message: "All expenses cleared".to_string(),
            }),
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

/// Download the collection as a JSON file
async fn export_expenses(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/expenses/export");
    let session = state.session.lock().await;
    match session.expenses().export_snapshot() {
        Ok(document) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.filename),
                ),
            ],
            document.content,
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

/// Replace the collection with an uploaded export document
async fn import_expenses(State(state): State<AppState>, body: String) -> impl IntoResponse {
    info!("POST /api/expenses/import - {} bytes", body.len());
    let mut session = state.session.lock().await;
    match session.expenses_mut().import_snapshot(&body).await {
        Ok(imported_count) => (
            StatusCode::OK,
            Json(ImportResponse {
                imported_count,
                success_message: format!("Imported {} expenses", imported_count),
            }),
        )
            .into_response(),
        Err(e) => domain_error(e),
    }
}

async fn get_statistics(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let session = state.session.lock().await;
    let month = query.month.filter(|m| !m.is_empty());
    let expenses = statistics::filter_by_month(session.expenses().expenses(), month.as_deref());
    let stats = statistics::calculate_statistics(&expenses);
    let breakdown = statistics::category_breakdown(&stats);

    let response = StatisticsResponse {
        month,
        statistics: stats,
        breakdown,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Months with expenses plus a comparison of the selected (or current) month
async fn get_months(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> impl IntoResponse {
    let session = state.session.lock().await;
    let expenses = session.expenses().expenses();
    let month = query
        .month
        .filter(|m| !m.is_empty())
        .unwrap_or_else(statistics::current_month);

    let response = MonthsResponse {
        months: statistics::available_months(expenses),
        comparison: statistics::monthly_comparison(expenses, &month),
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_for, send, send_request};
    use crate::storage::test_utils::TestEnvironment;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};

    fn expense_body(amount: f64, category: &str, date: &str) -> Value {
        json!({
            "amount": amount,
            "category": category,
            "date": date,
            "description": format!("{} purchase", category),
        })
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/expenses",
            Some(expense_body(50.0, "Food", "2024-03-10")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["expense"]["amount"], json!(50.0));
        assert!(body["expense"]["createdAt"].is_string());

        let (status, body) = send(&app, Method::GET, "/api/expenses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expenses"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;

        for amount in [0.0, -5.0] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/expenses",
                Some(expense_body(amount, "Food", "2024-03-10")),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (_, body) = send(&app, Method::GET, "/api/expenses", None).await;
        assert!(body["expenses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_delete_and_missing_ids() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/expenses",
            Some(expense_body(10.0, "Food", "2024-03-10")),
        )
        .await;
        let id = created["expense"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/expenses/{}", id),
            Some(json!({ "amount": 12.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expense"]["amount"], json!(12.0));

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/expenses/{}", id),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No fields to update");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/expenses/missing",
            Some(json!({ "amount": 1.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/expenses/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &format!("/api/expenses/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_and_sort() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;
        for (amount, category, date) in [
            (5.0, "Food", "2024-03-01"),
            (50.0, "Bills", "2024-03-05"),
            (20.0, "Food", "2024-02-10"),
        ] {
            send(
                &app,
                Method::POST,
                "/api/expenses",
                Some(expense_body(amount, category, date)),
            )
            .await;
        }

        let (_, body) = send(
            &app,
            Method::GET,
            "/api/expenses?month=2024-03&sort_by=amount&order=asc",
            None,
        )
        .await;
        let amounts: Vec<f64> = body["expenses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["amount"].as_f64().unwrap())
            .collect();
        assert_eq!(amounts, vec![5.0, 50.0]);

        let (_, body) = send(&app, Method::GET, "/api/expenses?category=Food", None).await;
        assert_eq!(body["expenses"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_statistics_and_months() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;
        for (amount, date) in [(50.0, "2024-03-10"), (25.0, "2024-02-10")] {
            send(
                &app,
                Method::POST,
                "/api/expenses",
                Some(expense_body(amount, "Food", date)),
            )
            .await;
        }

        let (status, body) = send(&app, Method::GET, "/api/statistics?month=2024-03", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statistics"]["total"], json!(50.0));
        assert_eq!(body["statistics"]["byMonth"]["2024-03"], json!(50.0));
        assert_eq!(body["breakdown"][0]["percentage"], json!(100.0));

        let (_, body) = send(&app, Method::GET, "/api/months?month=2024-03", None).await;
        assert_eq!(body["months"], json!(["2024-03", "2024-02"]));
        assert_eq!(body["comparison"]["percent_change"], json!(100.0));
        assert_eq!(body["comparison"]["is_increase"], json!(true));
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;
        send(
            &app,
            Method::POST,
            "/api/expenses",
            Some(expense_body(10.0, "Food", "2024-03-10")),
        )
        .await;

        let (status, exported) = send(&app, Method::GET, "/api/expenses/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exported.as_array().unwrap().len(), 1);

        send(&app, Method::DELETE, "/api/expenses", None).await;

        let request = Request::builder()
            .uri("/api/expenses/import")
            .method(Method::POST)
            .body(Body::from(exported.to_string()))
            .unwrap();
        let (status, body) = send_request(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imported_count"], json!(1));

        let (_, body) = send(&app, Method::GET, "/api/expenses", None).await;
        assert_eq!(body["expenses"], exported);
    }

    #[tokio::test]
    async fn test_invalid_import_is_unprocessable() {
        let env = TestEnvironment::new().unwrap();
        let app = app_for(&env).await;

        let request = Request::builder()
            .uri("/api/expenses/import")
            .method(Method::POST)
            .body(Body::from(r#"{"expenses": 1}"#))
            .unwrap();
        let (status, body) = send_request(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Invalid import format"));
    }
}
