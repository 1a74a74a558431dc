use super::StockError;

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LendBookError {
    /// 貸出可能な在庫がない
    OutOfStock,
}

impl From<StockError> for LendBookError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::Exhausted | StockError::Negative(_) => LendBookError::OutOfStock,
        }
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
}
