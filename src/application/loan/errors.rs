use thiserror::Error;

use super::notice::Notice;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 利用者が存在しない
    #[error("Borrower not found")]
    BorrowerNotFound,

    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 貸出可能な在庫がない
    #[error("No stock available for \"{title}\"")]
    OutOfStock { title: String },

    /// 存在しないページ番号
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// 蔵書登録の入力が不正
    #[error("Invalid book: {0}")]
    InvalidBook(String),

    /// LoanStoreのエラー
    #[error("Loan store error")]
    LoanStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// ReadModelのエラー
    #[error("Read model error")]
    ReadModelError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookCatalogのエラー
    #[error("Book catalog error")]
    BookCatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BorrowerDirectoryのエラー
    #[error("Borrower directory error")]
    BorrowerDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LoanApplicationError {
    /// 利用者が修正できるエラーの通知
    ///
    /// システム障害には通知を付けない。
    pub fn notice(&self) -> Option<Notice> {
        match self {
            LoanApplicationError::OutOfStock { title } => Some(Notice::error(format!(
                "Error: no stock available for \"{}\".",
                title
            ))),
            LoanApplicationError::BorrowerNotFound
            | LoanApplicationError::BookNotFound
            | LoanApplicationError::LoanNotFound
            | LoanApplicationError::PageNotFound(_)
            | LoanApplicationError::InvalidBook(_) => Some(Notice::error(self.to_string())),
            LoanApplicationError::LoanStoreError(_)
            | LoanApplicationError::ReadModelError(_)
            | LoanApplicationError::BookCatalogError(_)
            | LoanApplicationError::BorrowerDirectoryError(_) => None,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::loan::NoticeLevel;

    #[test]
    fn test_out_of_stock_notice_names_the_title() {
        let err = LoanApplicationError::OutOfStock {
            title: "Dune".to_string(),
        };
        let notice = err.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("\"Dune\""));
    }

    #[test]
    fn test_infrastructure_errors_have_no_notice() {
        let err = LoanApplicationError::LoanStoreError("connection reset".into());
        assert!(err.notice().is_none());
    }
}
