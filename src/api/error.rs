use crate::application::loan::LoanApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanApplicationError);

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let notice = self.0.notice();
        let message = self.0.to_string();

        let (status, error_type) = match &self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            LoanApplicationError::LoanNotFound => (StatusCode::NOT_FOUND, "LOAN_NOT_FOUND"),
            LoanApplicationError::BookNotFound => (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND"),
            LoanApplicationError::PageNotFound(_) => (StatusCode::NOT_FOUND, "PAGE_NOT_FOUND"),

            // 422 Unprocessable Entity - ビジネスルール違反・入力不備
            LoanApplicationError::OutOfStock { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "OUT_OF_STOCK")
            }
            LoanApplicationError::BorrowerNotFound => {
                (StatusCode::UNPROCESSABLE_ENTITY, "BORROWER_NOT_FOUND")
            }
            LoanApplicationError::InvalidBook(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_BOOK")
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LoanApplicationError::LoanStoreError(e) => {
                tracing::error!("Loan store error: {}", e);
                return internal_error("LOAN_STORE_ERROR", "Failed to update loans");
            }
            LoanApplicationError::ReadModelError(e) => {
                tracing::error!("Read model error: {}", e);
                return internal_error("READ_MODEL_ERROR", "Failed to read loans");
            }
            LoanApplicationError::BookCatalogError(e) => {
                tracing::error!("Book catalog error: {}", e);
                return internal_error("BOOK_CATALOG_ERROR", "Book catalog error");
            }
            LoanApplicationError::BorrowerDirectoryError(e) => {
                tracing::error!("Borrower directory error: {}", e);
                return internal_error("BORROWER_DIRECTORY_ERROR", "Borrower directory error");
            }
        };

        let body = Json(ErrorResponse::new(error_type, message).with_notice(notice));
        (status, body).into_response()
    }
}

fn internal_error(error_type: &str, message: &str) -> Response {
    let body = Json(ErrorResponse::new(error_type, message));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_maps_to_unprocessable_entity() {
        let response = ApiError::from(LoanApplicationError::OutOfStock {
            title: "Dune".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_variants_map_to_404() {
        for err in [
            LoanApplicationError::LoanNotFound,
            LoanApplicationError::BookNotFound,
            LoanApplicationError::PageNotFound(3),
        ] {
            assert_eq!(ApiError::from(err).into_response().status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_infrastructure_errors_map_to_500() {
        let response =
            ApiError::from(LoanApplicationError::ReadModelError("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
