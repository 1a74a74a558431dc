use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, confirm_delete_loan, create_loan, delete_loan, get_book, get_loan, list_loans,
    mark_returned, register_book,
};

/// Creates the API router with all loan management endpoints
///
/// Loans:
/// - GET /loans?page=N - List loans, 10 per page
/// - POST /loans - Create a loan
/// - GET /loans/:id - Loan details
/// - DELETE /loans/:id - Delete a loan
/// - GET /loans/:id/delete - Delete confirmation
/// - POST /loans/:id/delete - Delete a loan
/// - POST /loans/:id/return - Mark a loan as returned
///
/// Books:
/// - POST /books - Register a book with its stock
/// - GET /books/:id - Book details and current stock
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/:id", get(get_loan).delete(delete_loan))
        .route(
            "/loans/:id/delete",
            get(confirm_delete_loan).post(delete_loan),
        )
        .route("/loans/:id/return", post(mark_returned))
        .route("/books", post(register_book))
        .route("/books/:id", get(get_book))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
