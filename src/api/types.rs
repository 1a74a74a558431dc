use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::loan::{DeleteConfirmation, LoanPage, Notice};
use crate::domain::{Book, BookId, BorrowerId, commands::*};
use crate::ports::LoanView;

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// 1始まりのページ番号（省略時は1）
    pub page: Option<u32>,
}

/// 貸出作成リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub book_id: Uuid,
    pub borrower_id: Uuid,
}

impl CreateLoanRequest {
    /// 現在時刻で貸出コマンドに変換する
    pub fn to_command(&self) -> CreateLoan {
        CreateLoan {
            book_id: BookId::from_uuid(self.book_id),
            borrower_id: BorrowerId::from_uuid(self.borrower_id),
            loaned_at: Utc::now(),
        }
    }
}

/// 蔵書登録リクエスト（POST /books）
#[derive(Debug, Deserialize)]
pub struct RegisterBookRequest {
    pub title: String,
    pub stock: u32,
}

impl RegisterBookRequest {
    pub fn to_command(&self) -> RegisterBook {
        RegisterBook {
            title: self.title.clone(),
            stock: self.stock,
        }
    }
}

/// 貸出レスポンス（GET /loans/:id と GET /loans）
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub borrower_id: Uuid,
    pub loaned_at: DateTime<Utc>,
    pub status: String,
    pub returned: bool,
    pub return_date: Option<NaiveDate>,
}

impl From<LoanView> for LoanResponse {
    fn from(view: LoanView) -> Self {
        Self {
            loan_id: view.loan_id.value(),
            book_id: view.book_id.value(),
            status: view.status().as_str().to_string(),
            returned: view.returned(),
            return_date: view.return_date(),
            borrower_id: view.borrower_id.value(),
            loaned_at: view.loaned_at,
            book_title: view.book_title,
        }
    }
}

/// 貸出一覧レスポンス（GET /loans）
#[derive(Debug, Serialize)]
pub struct LoanPageResponse {
    pub loans: Vec<LoanResponse>,
    pub page: u32,
    pub total_pages: u32,
    pub total_loans: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<LoanPage> for LoanPageResponse {
    fn from(page: LoanPage) -> Self {
        Self {
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            page: page.page,
            total_pages: page.total_pages,
            total_loans: page.total_loans,
            loans: page.loans.into_iter().map(LoanResponse::from).collect(),
        }
    }
}

/// 貸出作成レスポンス
#[derive(Debug, Serialize)]
pub struct LoanCreatedResponse {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub borrower_id: Uuid,
    pub loaned_at: DateTime<Utc>,
    pub notice: Option<Notice>,
}

/// 返却レスポンス（POST /loans/:id/return）
#[derive(Debug, Serialize)]
pub struct LoanReturnedResponse {
    pub loan_id: Uuid,
    pub return_date: Option<NaiveDate>,
    /// 今回の操作より前に返却済みだったか
    pub already_returned: bool,
    pub notice: Option<Notice>,
}

/// 削除レスポンス
#[derive(Debug, Serialize)]
pub struct LoanDeletedResponse {
    pub loan_id: Uuid,
    pub stock_restored: bool,
    pub notice: Option<Notice>,
}

/// 削除確認レスポンス（GET /loans/:id/delete）
#[derive(Debug, Serialize)]
pub struct DeleteConfirmationResponse {
    pub loan: LoanResponse,
    pub restores_stock: bool,
}

impl From<DeleteConfirmation> for DeleteConfirmationResponse {
    fn from(confirmation: DeleteConfirmation) -> Self {
        Self {
            loan: LoanResponse::from(confirmation.loan),
            restores_stock: confirmation.restores_stock,
        }
    }
}

/// 蔵書レスポンス
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book_id: Uuid,
    pub title: String,
    pub stock: u32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            stock: book.stock.value(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }
}
