use crate::domain::value_objects::BorrowerId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者台帳ポート
///
/// 貸出管理は利用者IDのみを知り、利用者の詳細は知らない。
#[async_trait]
pub trait BorrowerDirectory: Send + Sync {
    /// 利用者が存在するか確認する
    ///
    /// 貸出作成前のバリデーションに使用される。
    async fn exists(&self, borrower_id: BorrowerId) -> Result<bool>;
}
