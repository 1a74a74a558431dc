use crate::domain::{Book, BookId, Stock, commands::RegisterBook};

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 在庫列（INTEGER）に保存できる上限
pub const MAX_STOCK: u32 = i32::MAX as u32;

/// 蔵書を登録する
///
/// タイトルは空白のみであってはならない。在庫は`MAX_STOCK`以下。
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<Book> {
    let title = cmd.title.trim();
    if title.is_empty() {
        return Err(LoanApplicationError::InvalidBook(
            "title must not be empty".to_string(),
        ));
    }

    if cmd.stock > MAX_STOCK {
        return Err(LoanApplicationError::InvalidBook(format!(
            "stock must not exceed {}",
            MAX_STOCK
        )));
    }

    let book = Book::new(title, Stock::new(cmd.stock));
    deps.book_catalog
        .add(book.clone())
        .await
        .map_err(LoanApplicationError::BookCatalogError)?;

    tracing::info!(book_id = %book.book_id.value(), stock = cmd.stock, "Book registered");
    Ok(book)
}

/// IDで蔵書と現在の在庫を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_catalog
        .get_by_id(book_id)
        .await
        .map_err(LoanApplicationError::BookCatalogError)?
        .ok_or(LoanApplicationError::BookNotFound)
}
