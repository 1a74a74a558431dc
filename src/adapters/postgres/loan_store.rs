use crate::domain::{Book, BookId, BorrowerId, Loan, LoanId, LoanState, Stock};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, LoanTransaction, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをBookに変換する
///
/// stockのi32から在庫への変換でエラーハンドリングを行う。
pub(super) fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let stock_i32: i32 = row.get("stock");
    let stock = Stock::try_from(stock_i32)
        .map_err(|_| invalid_data(format!("stock out of range: {}", stock_i32)))?;

    Ok(Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        title: row.get("title"),
        stock,
    })
}

/// PostgreSQLの行データをLoanに変換する
///
/// returnedとreturn_dateの組み合わせが不整合な行はエラーにする。
pub(super) fn map_row_to_loan_state(row: &PgRow) -> Result<LoanState> {
    let returned: bool = row.get("returned");
    let return_date = row.get("return_date");
    LoanState::from_columns(returned, return_date).ok_or_else(|| {
        invalid_data(format!(
            "inconsistent loan state: returned={} return_date={:?}",
            returned, return_date
        ))
    })
}

fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    Ok(Loan {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        borrower_id: BorrowerId::from_uuid(row.get("borrower_id")),
        loaned_at: row.get("loaned_at"),
        state: map_row_to_loan_state(row)?,
    })
}

/// LoanStoreのPostgreSQL実装
///
/// 1操作につき1つのデータベーストランザクションを開始する。
pub struct LoanStore {
    pool: PgPool,
}

impl LoanStore {
    /// PostgreSQLコネクションプールから新しいLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn begin(&self) -> Result<Box<dyn LoanTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// PostgreSQLトランザクション
///
/// コミットせずにdropされた場合、sqlxがロールバックする。
/// 行ロックはトランザクション終了時にデータベースが解放する。
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LoanTransaction for PostgresTransaction {
    /// SELECT ... FOR UPDATEで蔵書行を排他ロックする
    async fn lock_book(&mut self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, stock
            FROM books
            WHERE book_id = $1
            FOR UPDATE
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_book(&mut self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, stock
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_loan(&mut self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT loan_id, book_id, borrower_id, loaned_at, returned, return_date
            FROM loans
            WHERE loan_id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn insert_loan(&mut self, loan: &Loan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (loan_id, book_id, borrower_id, loaned_at, returned, return_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.borrower_id.value())
        .bind(loan.loaned_at)
        .bind(loan.is_returned())
        .bind(loan.return_date())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn update_loan(&mut self, loan: &Loan) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE loans
            SET returned = $2, return_date = $3
            WHERE loan_id = $1
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.is_returned())
        .bind(loan.return_date())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete_loan(&mut self, loan_id: LoanId) -> Result<()> {
        sqlx::query("DELETE FROM loans WHERE loan_id = $1")
            .bind(loan_id.value())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn set_stock(&mut self, book_id: BookId, stock: Stock) -> Result<()> {
        let stock = i32::try_from(stock.value())?;
        sqlx::query("UPDATE books SET stock = $2 WHERE book_id = $1")
            .bind(book_id.value())
            .bind(stock)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    /// 在庫を1冊戻す
    ///
    /// 事前のFOR UPDATEは取らず、加算のみを行う。
    async fn restock_book(&mut self, book_id: BookId) -> Result<()> {
        sqlx::query("UPDATE books SET stock = stock + 1 WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PostgresTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
