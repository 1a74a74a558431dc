use crate::domain::BorrowerId;
use crate::ports::borrower_directory::{BorrowerDirectory as BorrowerDirectoryTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

/// BorrowerDirectoryのPostgreSQL実装
///
/// borrowersテーブルは利用者管理側が所有し、ここでは存在確認のみ行う。
pub struct BorrowerDirectory {
    pool: PgPool,
}

impl BorrowerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowerDirectoryTrait for BorrowerDirectory {
    async fn exists(&self, borrower_id: BorrowerId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM borrowers WHERE borrower_id = $1)")
                .bind(borrower_id.value())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
