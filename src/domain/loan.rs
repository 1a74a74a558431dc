use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookId, BorrowerId, LendBookError, LoanId, ReturnLoanError};

/// 貸出の状態
///
/// 返却済みなら返却日が必ず存在する（型で保証）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoanState {
    Active,
    Returned { return_date: NaiveDate },
}

impl LoanState {
    /// 永続化された列（returned, return_date）から状態を復元する
    ///
    /// 返却フラグと返却日が食い違う行はNoneになる。
    pub fn from_columns(returned: bool, return_date: Option<NaiveDate>) -> Option<Self> {
        match (returned, return_date) {
            (false, None) => Some(LoanState::Active),
            (true, Some(return_date)) => Some(LoanState::Returned { return_date }),
            _ => None,
        }
    }
}

/// 貸出記録 - 1冊の書籍の1回の貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub borrower_id: BorrowerId,
    pub loaned_at: DateTime<Utc>,
    pub state: LoanState,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        matches!(self.state, LoanState::Returned { .. })
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        match self.state {
            LoanState::Active => None,
            LoanState::Returned { return_date } => Some(return_date),
        }
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 在庫が1冊以上あること
/// - 新しい貸出は未返却
/// - 蔵書の在庫は1冊減る
///
/// 呼び出し側は蔵書をロックした状態で最新の在庫を渡すこと。
/// 副作用なし。新しいLoanと更新後のBookを返す。
pub fn lend_book(
    book: &Book,
    borrower_id: BorrowerId,
    loaned_at: DateTime<Utc>,
) -> Result<(Loan, Book), LendBookError> {
    let remaining = book.stock.take_one()?;

    let loan = Loan {
        loan_id: LoanId::new(),
        book_id: book.book_id,
        borrower_id,
        loaned_at,
        state: LoanState::Active,
    };

    let updated_book = Book {
        stock: remaining,
        ..book.clone()
    };

    Ok((loan, updated_book))
}

/// 純粋関数：貸出を返却済みにする
///
/// ビジネスルール：
/// - 返却済みの貸出は再度返却できない
/// - 返却日が記録される
pub fn return_loan(loan: &Loan, returned_on: NaiveDate) -> Result<Loan, ReturnLoanError> {
    if loan.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        state: LoanState::Returned {
            return_date: returned_on,
        },
        ..loan.clone()
    })
}

/// 貸出を削除したときに在庫を戻すべきか
///
/// 返却済みの貸出は返却時に在庫が戻っているため対象外。
pub fn restores_stock_on_delete(loan: &Loan) -> bool {
    !loan.is_returned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stock;

    fn dune(stock: u32) -> Book {
        Book::new("Dune", Stock::new(stock))
    }

    #[test]
    fn test_lend_book_creates_active_loan_and_decrements_stock() {
        let book = dune(2);
        let borrower_id = BorrowerId::new();
        let now = Utc::now();

        let (loan, updated) = lend_book(&book, borrower_id, now).unwrap();

        assert_eq!(loan.book_id, book.book_id);
        assert_eq!(loan.borrower_id, borrower_id);
        assert_eq!(loan.loaned_at, now);
        assert_eq!(loan.state, LoanState::Active);
        assert!(!loan.is_returned());
        assert_eq!(loan.return_date(), None);
        assert_eq!(updated.stock.value(), 1);
        assert_eq!(updated.title, "Dune");
    }

    #[test]
    fn test_lend_book_fails_without_stock() {
        let book = dune(0);
        let result = lend_book(&book, BorrowerId::new(), Utc::now());
        assert_eq!(result.unwrap_err(), LendBookError::OutOfStock);
    }

    #[test]
    fn test_return_loan_sets_return_date() {
        let (loan, _) = lend_book(&dune(1), BorrowerId::new(), Utc::now()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let returned = return_loan(&loan, today).unwrap();

        assert!(returned.is_returned());
        assert_eq!(returned.return_date(), Some(today));
        assert_eq!(returned.loan_id, loan.loan_id);
    }

    #[test]
    fn test_return_loan_fails_when_already_returned() {
        let (loan, _) = lend_book(&dune(1), BorrowerId::new(), Utc::now()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let returned = return_loan(&loan, today).unwrap();

        let result = return_loan(&returned, today);
        assert_eq!(result.unwrap_err(), ReturnLoanError::AlreadyReturned);
    }

    #[test]
    fn test_restores_stock_on_delete_only_for_active_loans() {
        let (loan, _) = lend_book(&dune(1), BorrowerId::new(), Utc::now()).unwrap();
        assert!(restores_stock_on_delete(&loan));

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let returned = return_loan(&loan, today).unwrap();
        assert!(!restores_stock_on_delete(&returned));
    }

    #[test]
    fn test_loan_state_from_columns() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(LoanState::from_columns(false, None), Some(LoanState::Active));
        assert_eq!(
            LoanState::from_columns(true, Some(date)),
            Some(LoanState::Returned { return_date: date })
        );
        // 返却フラグと返却日の不整合
        assert_eq!(LoanState::from_columns(true, None), None);
        assert_eq!(LoanState::from_columns(false, Some(date)), None);
    }

    #[test]
    fn test_book_restocked() {
        let book = dune(0);
        let restocked = book.restocked();
        assert_eq!(restocked.stock.value(), 1);
        assert_eq!(restocked.book_id, book.book_id);
    }
}
