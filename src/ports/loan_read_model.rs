use crate::domain::{BookId, BorrowerId, LoanId, LoanState};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ステータス（一覧・詳細表示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
        }
    }
}

impl From<LoanState> for LoanStatus {
    fn from(state: LoanState) -> Self {
        match state {
            LoanState::Active => LoanStatus::Active,
            LoanState::Returned { .. } => LoanStatus::Returned,
        }
    }
}

/// 貸出ビュー
///
/// 書籍タイトルを結合した表示用の非正規化ビュー。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub book_title: String,
    pub borrower_id: BorrowerId,
    pub loaned_at: DateTime<Utc>,
    pub state: LoanState,
}

impl LoanView {
    pub fn status(&self) -> LoanStatus {
        LoanStatus::from(self.state)
    }

    pub fn returned(&self) -> bool {
        matches!(self.state, LoanState::Returned { .. })
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        match self.state {
            LoanState::Active => None,
            LoanState::Returned { return_date } => Some(return_date),
        }
    }
}

/// 貸出一覧の1ページ分と全件数
#[derive(Debug, Clone)]
pub struct LoanSlice {
    pub loans: Vec<LoanView>,
    pub total: u64,
}

/// 貸出Read Modelポート
#[async_trait]
pub trait LoanReadModel: Send + Sync {
    /// 貸出を新しい順に取得する
    ///
    /// `offset`件を読み飛ばし、最大`limit`件を返す。`total`は全件数。
    async fn list(&self, offset: u64, limit: u32) -> Result<LoanSlice>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<LoanView>>;
}
