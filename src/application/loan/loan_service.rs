use crate::domain::{self, Book, Loan, LendBookError, ReturnLoanError, commands::*};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};
use super::notice::{Notice, Outcome};

/// サービスの依存関係
///
/// 振る舞い（メソッド）は持たず、関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_store: Arc<dyn LoanStore>,
    pub loan_read_model: Arc<dyn LoanReadModel>,
    pub book_catalog: Arc<dyn BookCatalog>,
    pub borrower_directory: Arc<dyn BorrowerDirectory>,
}

/// 返却処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// 今回の操作で返却済みになった
    Returned(Loan),
    /// 既に返却済みだった（何も変更していない）
    AlreadyReturned(Loan),
}

/// 削除された貸出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedLoan {
    pub loan: Loan,
    /// 未返却だったため在庫を戻したか
    pub stock_restored: bool,
}

async fn begin(deps: &ServiceDependencies) -> Result<Box<dyn LoanTransaction>> {
    deps.loan_store
        .begin()
        .await
        .map_err(LoanApplicationError::LoanStoreError)
}

/// トランザクション内で貸出記録を読み込むヘルパー関数
///
/// # エラー
/// - LoanStoreError: 読み込み失敗
/// - LoanNotFound: 貸出が存在しない
async fn load_loan(tx: &mut Box<dyn LoanTransaction>, loan_id: domain::LoanId) -> Result<Loan> {
    tx.find_loan(loan_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

/// 通知メッセージ用に貸出先の蔵書を読み込む（ロックなし）
async fn load_book(tx: &mut Box<dyn LoanTransaction>, book_id: domain::BookId) -> Result<Book> {
    tx.find_book(book_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?
        .ok_or(LoanApplicationError::BookNotFound)
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 利用者が存在すること
/// - 書籍が存在すること
/// - ロック取得後に読み直した在庫が1冊以上あること
///
/// # 一貫性保証
///
/// 蔵書行の排他ロックを取ってから在庫を読み直し、貸出記録の作成と
/// 在庫の減算を同じトランザクションでコミットする。同じ蔵書への
/// 同時リクエストはロックで直列化されるため、在庫が負になることはない。
///
/// 在庫切れの場合はトランザクションを破棄し、何も変更しない。
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<Outcome<Loan>> {
    // 1. 利用者の存在確認
    let borrower_exists = deps
        .borrower_directory
        .exists(cmd.borrower_id)
        .await
        .map_err(LoanApplicationError::BorrowerDirectoryError)?;

    if !borrower_exists {
        return Err(LoanApplicationError::BorrowerNotFound);
    }

    // 2. 蔵書行をロックして最新の在庫を読む
    let mut tx = begin(deps).await?;
    let book = tx
        .lock_book(cmd.book_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?
        .ok_or(LoanApplicationError::BookNotFound)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let lent = domain::loan::lend_book(&book, cmd.borrower_id, cmd.loaned_at);
    let (loan, updated_book) = match lent {
        Ok(lent) => lent,
        Err(LendBookError::OutOfStock) => {
            tracing::warn!(book_id = %book.book_id.value(), title = %book.title, "No stock available");
            return Err(LoanApplicationError::OutOfStock { title: book.title });
        }
    };

    // 4. 貸出記録と在庫を保存してコミット
    tx.insert_loan(&loan)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;
    tx.set_stock(updated_book.book_id, updated_book.stock)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;
    tx.commit()
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;

    tracing::info!(
        loan_id = %loan.loan_id.value(),
        book_id = %loan.book_id.value(),
        stock = updated_book.stock.value(),
        "Loan created"
    );

    let notice = Notice::success(format!(
        "Loan recorded. Stock of \"{}\" updated.",
        updated_book.title
    ));
    Ok(Outcome::with_notice(loan, notice))
}

/// 貸出を返却済みにする
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 既に返却済みの場合は何もせず警告を返す（冪等）
/// - 返却時に返却日を記録し、在庫を1冊戻す
///
/// `lock_book`による在庫の読み直しは行わない。在庫の書き戻しだけが行ロックに従う。
pub async fn mark_returned(
    deps: &ServiceDependencies,
    cmd: MarkReturned,
) -> Result<Outcome<ReturnOutcome>> {
    let mut tx = begin(deps).await?;

    // 1. 貸出を読み込む
    let loan = load_loan(&mut tx, cmd.loan_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let returned = match domain::loan::return_loan(&loan, cmd.returned_on) {
        Ok(returned) => returned,
        Err(ReturnLoanError::AlreadyReturned) => {
            return Ok(Outcome::with_notice(
                ReturnOutcome::AlreadyReturned(loan),
                Notice::warning("The book was already marked as returned."),
            ));
        }
    };

    let book = load_book(&mut tx, returned.book_id).await?;

    // 3. 返却状態を保存してから在庫を戻す
    tx.update_loan(&returned)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;
    tx.restock_book(returned.book_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;
    tx.commit()
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;

    tracing::info!(loan_id = %returned.loan_id.value(), "Loan marked as returned");

    let notice = Notice::success(format!("Book \"{}\" returned. Stock updated.", book.title));
    Ok(Outcome::with_notice(ReturnOutcome::Returned(returned), notice))
}

/// 貸出記録を削除する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 未返却の貸出なら先に在庫を1冊戻す
/// - 返却済みなら在庫には触れない（返却時に戻し済み）
pub async fn delete_loan(deps: &ServiceDependencies, cmd: DeleteLoan) -> Result<Outcome<DeletedLoan>> {
    let mut tx = begin(deps).await?;

    let loan = load_loan(&mut tx, cmd.loan_id).await?;
    let stock_restored = domain::loan::restores_stock_on_delete(&loan);

    let notice = if stock_restored {
        let book = load_book(&mut tx, loan.book_id).await?;
        tx.restock_book(loan.book_id)
            .await
            .map_err(LoanApplicationError::LoanStoreError)?;
        Some(Notice::info(format!("Stock of \"{}\" restored.", book.title)))
    } else {
        None
    };

    tx.delete_loan(loan.loan_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;
    tx.commit()
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;

    tracing::info!(loan_id = %loan.loan_id.value(), stock_restored, "Loan deleted");

    Ok(Outcome {
        value: DeletedLoan {
            loan,
            stock_restored,
        },
        notice,
    })
}
