use crate::application::loan::{
    ReturnOutcome, ServiceDependencies, confirm_delete, create_loan as execute_create_loan,
    delete_loan as execute_delete_loan, get_book as execute_get_book,
    get_loan as execute_get_loan, list_loans as execute_list_loans,
    mark_returned as execute_mark_returned, register_book as execute_register_book,
};
use crate::domain::{
    BookId, LoanId,
    commands::{DeleteLoan, MarkReturned},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        BookResponse, CreateLoanRequest, DeleteConfirmationResponse, ListLoansQuery,
        LoanCreatedResponse, LoanDeletedResponse, LoanPageResponse, LoanResponse,
        LoanReturnedResponse, RegisterBookRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 利用者が存在すること
/// - 書籍が存在すること
/// - 書籍の在庫が1冊以上あること（在庫切れは422とエラー通知）
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanCreatedResponse>), ApiError> {
    let outcome = execute_create_loan(&state.service_deps, req.to_command()).await?;
    let loan = outcome.value;

    let response = LoanCreatedResponse {
        loan_id: loan.loan_id.value(),
        book_id: loan.book_id.value(),
        borrower_id: loan.borrower_id.value(),
        loaned_at: loan.loaned_at,
        notice: outcome.notice,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /loans/:id/return - 貸出を返却済みにする
///
/// 既に返却済みの場合も200を返し、警告の通知を付ける（冪等）。
pub async fn mark_returned(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanReturnedResponse>, ApiError> {
    let cmd = MarkReturned {
        loan_id: LoanId::from_uuid(loan_id),
        returned_on: chrono::Utc::now().date_naive(),
    };

    let outcome = execute_mark_returned(&state.service_deps, cmd).await?;

    let (loan, already_returned) = match outcome.value {
        ReturnOutcome::Returned(loan) => (loan, false),
        ReturnOutcome::AlreadyReturned(loan) => (loan, true),
    };

    Ok(Json(LoanReturnedResponse {
        loan_id: loan.loan_id.value(),
        return_date: loan.return_date(),
        already_returned,
        notice: outcome.notice,
    }))
}

/// DELETE /loans/:id, POST /loans/:id/delete - 貸出を削除
///
/// 未返却の貸出は在庫を戻してから削除する。
pub async fn delete_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanDeletedResponse>, ApiError> {
    let cmd = DeleteLoan {
        loan_id: LoanId::from_uuid(loan_id),
    };

    let outcome = execute_delete_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanDeletedResponse {
        loan_id: outcome.value.loan.loan_id.value(),
        stock_restored: outcome.value.stock_restored,
        notice: outcome.notice,
    }))
}

/// POST /books - 蔵書を登録
pub async fn register_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = execute_register_book(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans - 貸出一覧（1ページ10件、新しい順）
///
/// クエリパラメータ:
/// - page: 1始まりのページ番号（省略時は1）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<LoanPageResponse>, ApiError> {
    let page = execute_list_loans(&state.service_deps, query.page.unwrap_or(1)).await?;
    Ok(Json(LoanPageResponse::from(page)))
}

/// GET /loans/:id - 貸出詳細をIDで取得
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = execute_get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    Ok(Json(LoanResponse::from(loan)))
}

/// GET /loans/:id/delete - 削除確認
///
/// 削除すると在庫が戻るかどうかを返す。何も変更しない。
pub async fn confirm_delete_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<DeleteConfirmationResponse>, ApiError> {
    let confirmation = confirm_delete(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    Ok(Json(DeleteConfirmationResponse::from(confirmation)))
}

/// GET /books/:id - 蔵書と現在の在庫を取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = execute_get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(Json(BookResponse::from(book)))
}
