use crate::domain::{BookId, BorrowerId, LoanId};
use crate::ports::loan_read_model::{
    LoanReadModel as LoanReadModelTrait, LoanSlice, LoanView, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::loan_store::map_row_to_loan_state;

/// PostgreSQLの行データをLoanViewに変換する
fn map_row_to_loan_view(row: &PgRow) -> Result<LoanView> {
    Ok(LoanView {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        book_title: row.get("title"),
        borrower_id: BorrowerId::from_uuid(row.get("borrower_id")),
        loaned_at: row.get("loaned_at"),
        state: map_row_to_loan_state(row)?,
    })
}

/// LoanReadModelのPostgreSQL実装
///
/// loansとbooksを結合し、書籍タイトルつきのビューを返す。
pub struct LoanReadModel {
    pool: PgPool,
}

impl LoanReadModel {
    /// PostgreSQLコネクションプールから新しいLoanReadModelを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanReadModelTrait for LoanReadModel {
    /// 貸出を新しい順に取得（一覧表示用）
    ///
    /// loaned_atの降順インデックスを使用する。
    async fn list(&self, offset: u64, limit: u32) -> Result<LoanSlice> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT
                l.loan_id,
                l.book_id,
                b.title,
                l.borrower_id,
                l.loaned_at,
                l.returned,
                l.return_date
            FROM loans l
            JOIN books b ON b.book_id = l.book_id
            ORDER BY l.loaned_at DESC, l.loan_id ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(i64::try_from(offset)?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let loans = rows
            .iter()
            .map(map_row_to_loan_view)
            .collect::<Result<Vec<_>>>()?;

        Ok(LoanSlice {
            loans,
            total: u64::try_from(total)?,
        })
    }

    /// IDで貸出を取得
    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<LoanView>> {
        let row = sqlx::query(
            r#"
            SELECT
                l.loan_id,
                l.book_id,
                b.title,
                l.borrower_id,
                l.loaned_at,
                l.returned,
                l.return_date
            FROM loans l
            JOIN books b ON b.book_id = l.book_id
            WHERE l.loan_id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan_view).transpose()
    }
}
