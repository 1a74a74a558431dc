use crate::domain::{Book, BookId, Loan, LoanId, Stock};
use crate::ports::{
    book_catalog::{self, BookCatalog},
    loan_read_model::{self, LoanReadModel, LoanSlice, LoanView},
    loan_store::{self, LoanStore, LoanTransaction},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
struct Tables {
    books: HashMap<BookId, Book>,
    loans: HashMap<LoanId, Loan>,
}

#[derive(Default)]
struct Shared {
    tables: Mutex<Tables>,
    book_locks: Mutex<HashMap<BookId, Arc<AsyncMutex<()>>>>,
}

impl Shared {
    fn book_lock(&self, book_id: BookId) -> Arc<AsyncMutex<()>> {
        self.book_locks.lock().entry(book_id).or_default().clone()
    }
}

/// インメモリの蔵書・貸出ストア
///
/// 開発用とテスト用。`LoanStore`、`LoanReadModel`、`BookCatalog`を1つの
/// 共有状態の上に実装する。蔵書ごとの非同期Mutexが行ロックの代わりになる。
#[derive(Clone, Default)]
pub struct InMemoryLibrary {
    shared: Arc<Shared>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }
}

enum PendingWrite {
    InsertLoan(Loan),
    UpdateLoan(Loan),
    DeleteLoan(LoanId),
    SetStock(BookId, Stock),
    Restock(BookId),
}

/// インメモリのトランザクション
///
/// 書き込みはコミットまでバッファされる。未コミットの書き込みは
/// 同じトランザクション内の読み込みにも見えない。
/// dropするとバッファを捨て、保持中の蔵書ロックを解放する。
pub struct InMemoryTransaction {
    shared: Arc<Shared>,
    held_locks: HashMap<BookId, OwnedMutexGuard<()>>,
    pending: Vec<PendingWrite>,
}

#[async_trait]
impl LoanStore for InMemoryLibrary {
    async fn begin(&self) -> loan_store::Result<Box<dyn LoanTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            shared: self.shared.clone(),
            held_locks: HashMap::new(),
            pending: Vec::new(),
        }))
    }
}

impl InMemoryTransaction {
    /// 蔵書の行ロックを取得し、トランザクション終了まで保持する
    ///
    /// 存在しない蔵書にはロックを作らず`false`を返す。蔵書は削除されないため、
    /// 確認後に消えることはない。
    async fn acquire_book_lock(&mut self, book_id: BookId) -> bool {
        if self.held_locks.contains_key(&book_id) {
            return true;
        }

        let exists = self.shared.tables.lock().books.contains_key(&book_id);
        if !exists {
            return false;
        }

        let guard = self.shared.book_lock(book_id).lock_owned().await;
        self.held_locks.insert(book_id, guard);
        true
    }
}

#[async_trait]
impl LoanTransaction for InMemoryTransaction {
    async fn lock_book(&mut self, book_id: BookId) -> loan_store::Result<Option<Book>> {
        if !self.acquire_book_lock(book_id).await {
            return Ok(None);
        }

        // ロック取得後に読み直す
        Ok(self.shared.tables.lock().books.get(&book_id).cloned())
    }

    async fn find_book(&mut self, book_id: BookId) -> loan_store::Result<Option<Book>> {
        Ok(self.shared.tables.lock().books.get(&book_id).cloned())
    }

    async fn find_loan(&mut self, loan_id: LoanId) -> loan_store::Result<Option<Loan>> {
        Ok(self.shared.tables.lock().loans.get(&loan_id).cloned())
    }

    async fn insert_loan(&mut self, loan: &Loan) -> loan_store::Result<()> {
        self.pending.push(PendingWrite::InsertLoan(loan.clone()));
        Ok(())
    }

    async fn update_loan(&mut self, loan: &Loan) -> loan_store::Result<()> {
        self.pending.push(PendingWrite::UpdateLoan(loan.clone()));
        Ok(())
    }

    async fn delete_loan(&mut self, loan_id: LoanId) -> loan_store::Result<()> {
        self.pending.push(PendingWrite::DeleteLoan(loan_id));
        Ok(())
    }

    async fn set_stock(&mut self, book_id: BookId, stock: Stock) -> loan_store::Result<()> {
        if !self.held_locks.contains_key(&book_id) {
            return Err(format!("book {} is not locked by this transaction", book_id.value()).into());
        }
        self.pending.push(PendingWrite::SetStock(book_id, stock));
        Ok(())
    }

    async fn restock_book(&mut self, book_id: BookId) -> loan_store::Result<()> {
        // UPDATEが行ロックを待つのと同じく、ロック中の貸出作成が終わるまで待つ。
        // 存在しない蔵書はコミット時の検証で弾かれる。
        self.acquire_book_lock(book_id).await;
        self.pending.push(PendingWrite::Restock(book_id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> loan_store::Result<()> {
        let InMemoryTransaction {
            shared,
            held_locks,
            pending,
        } = *self;
        let mut tables = shared.tables.lock();

        // 外部キー相当の検証を先に済ませ、途中で失敗しても何も反映しない
        for write in &pending {
            let book_id = match write {
                PendingWrite::InsertLoan(loan) => loan.book_id,
                PendingWrite::SetStock(book_id, _) | PendingWrite::Restock(book_id) => *book_id,
                PendingWrite::UpdateLoan(_) | PendingWrite::DeleteLoan(_) => continue,
            };
            if !tables.books.contains_key(&book_id) {
                return Err(format!("book {} does not exist", book_id.value()).into());
            }
        }

        for write in pending {
            match write {
                PendingWrite::InsertLoan(loan) => {
                    tables.loans.insert(loan.loan_id, loan);
                }
                PendingWrite::UpdateLoan(loan) => {
                    if let Some(stored) = tables.loans.get_mut(&loan.loan_id) {
                        *stored = loan;
                    }
                }
                PendingWrite::DeleteLoan(loan_id) => {
                    tables.loans.remove(&loan_id);
                }
                PendingWrite::SetStock(book_id, stock) => {
                    if let Some(book) = tables.books.get_mut(&book_id) {
                        book.stock = stock;
                    }
                }
                PendingWrite::Restock(book_id) => {
                    if let Some(book) = tables.books.get_mut(&book_id) {
                        book.stock = book.stock.put_back();
                    }
                }
            }
        }

        // 書き込みを反映してから蔵書ロックを解放する
        drop(tables);
        drop(held_locks);
        Ok(())
    }
}

fn to_view(loan: &Loan, books: &HashMap<BookId, Book>) -> LoanView {
    LoanView {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        book_title: books
            .get(&loan.book_id)
            .map(|book| book.title.clone())
            .unwrap_or_default(),
        borrower_id: loan.borrower_id,
        loaned_at: loan.loaned_at,
        state: loan.state,
    }
}

#[async_trait]
impl LoanReadModel for InMemoryLibrary {
    async fn list(&self, offset: u64, limit: u32) -> loan_read_model::Result<LoanSlice> {
        let tables = self.shared.tables.lock();

        let mut loans: Vec<&Loan> = tables.loans.values().collect();
        loans.sort_by(|a, b| {
            b.loaned_at
                .cmp(&a.loaned_at)
                .then_with(|| a.loan_id.value().cmp(&b.loan_id.value()))
        });

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let page = loans
            .iter()
            .skip(skip)
            .take(take)
            .map(|loan| to_view(loan, &tables.books))
            .collect();

        Ok(LoanSlice {
            loans: page,
            total: tables.loans.len() as u64,
        })
    }

    async fn get_by_id(&self, loan_id: LoanId) -> loan_read_model::Result<Option<LoanView>> {
        let tables = self.shared.tables.lock();
        Ok(tables
            .loans
            .get(&loan_id)
            .map(|loan| to_view(loan, &tables.books)))
    }
}

#[async_trait]
impl BookCatalog for InMemoryLibrary {
    async fn add(&self, book: Book) -> book_catalog::Result<()> {
        let mut tables = self.shared.tables.lock();
        if tables.books.contains_key(&book.book_id) {
            return Err(format!("book {} already exists", book.book_id.value()).into());
        }
        tables.books.insert(book.book_id, book);
        Ok(())
    }

    async fn get_by_id(&self, book_id: BookId) -> book_catalog::Result<Option<Book>> {
        Ok(self.shared.tables.lock().books.get(&book_id).cloned())
    }
}
