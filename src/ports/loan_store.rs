use crate::domain::{Book, BookId, Loan, LoanId, Stock};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ストアポート
///
/// 貸出記録と蔵書在庫を1つのトランザクションで更新するための入口。
/// 1操作につき1トランザクションを開始する。
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// 新しいトランザクションを開始する
    async fn begin(&self) -> Result<Box<dyn LoanTransaction>>;
}

/// 貸出トランザクション
///
/// 書き込みは`commit`が成功したときにのみ反映される。
/// コミットせずにdropした場合はロールバックされ、保持中のロックも解放される。
#[async_trait]
pub trait LoanTransaction: Send {
    /// 蔵書行を排他ロックし、ロック取得後の最新状態を読む
    ///
    /// ロックはトランザクション終了まで保持される（SELECT ... FOR UPDATE相当）。
    /// 同じ蔵書に対する他のトランザクションの`lock_book`はそれまで待たされる。
    async fn lock_book(&mut self, book_id: BookId) -> Result<Option<Book>>;

    /// 蔵書をロックせずに読む
    async fn find_book(&mut self, book_id: BookId) -> Result<Option<Book>>;

    /// 貸出記録を読む
    async fn find_loan(&mut self, loan_id: LoanId) -> Result<Option<Loan>>;

    async fn insert_loan(&mut self, loan: &Loan) -> Result<()>;

    /// 貸出記録の返却状態を更新する
    async fn update_loan(&mut self, loan: &Loan) -> Result<()>;

    async fn delete_loan(&mut self, loan_id: LoanId) -> Result<()>;

    /// ロック済みの蔵書の在庫を書き込む
    async fn set_stock(&mut self, book_id: BookId, stock: Stock) -> Result<()>;

    /// 在庫を1冊戻す
    ///
    /// `lock_book`のようにロック後の在庫を読み直すことはしないが、
    /// 書き込みは行ロックに従う（UPDATE ... SET stock = stock + 1相当）。
    /// 他のトランザクションが蔵書をロック中なら、その終了まで待たされる。
    async fn restock_book(&mut self, book_id: BookId) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
