use crate::domain::{Book, BookId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 蔵書カタログポート
///
/// 在庫の増減は`LoanStore`経由でのみ行い、ここでは登録と参照だけを扱う。
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// 蔵書を初期在庫つきで登録する
    async fn add(&self, book: Book) -> Result<()>;

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;
}
