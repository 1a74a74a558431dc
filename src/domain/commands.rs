use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowerId, LoanId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub book_id: BookId,
    pub borrower_id: BorrowerId,
    pub loaned_at: DateTime<Utc>,
}

/// コマンド：貸出を返却済みにする
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReturned {
    pub loan_id: LoanId,
    pub returned_on: NaiveDate,
}

/// コマンド：貸出記録を削除する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLoan {
    pub loan_id: LoanId,
}

/// コマンド：蔵書を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub title: String,
    pub stock: u32,
}
