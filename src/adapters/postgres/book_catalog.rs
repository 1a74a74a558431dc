use crate::domain::{Book, BookId};
use crate::ports::book_catalog::{BookCatalog as BookCatalogTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::loan_store::map_row_to_book;

/// BookCatalogのPostgreSQL実装
pub struct BookCatalog {
    pool: PgPool,
}

impl BookCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookCatalogTrait for BookCatalog {
    async fn add(&self, book: Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, title, stock)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(i32::try_from(book.stock.value())?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT book_id, title, stock FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }
}
