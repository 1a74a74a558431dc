use crate::domain::LoanId;
use crate::ports::LoanView;

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 一覧の1ページあたりの件数
pub const PAGE_SIZE: u32 = 10;

/// 貸出一覧の1ページ
#[derive(Debug, Clone)]
pub struct LoanPage {
    pub loans: Vec<LoanView>,
    /// 1始まりのページ番号
    pub page: u32,
    pub total_pages: u32,
    pub total_loans: u64,
}

impl LoanPage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// 削除確認画面用の情報
#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    pub loan: LoanView,
    /// 削除すると在庫が1冊戻るか
    pub restores_stock: bool,
}

/// 件数からページ数を求める（0件でも1ページ）
fn page_count(total: u64) -> u32 {
    let pages = total.div_ceil(u64::from(PAGE_SIZE)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// 貸出一覧を新しい順に取得する
///
/// 1ページ目は常に有効（空でもよい）。0ページ目と最終ページより後は`PageNotFound`。
pub async fn list_loans(deps: &ServiceDependencies, page: u32) -> Result<LoanPage> {
    if page == 0 {
        return Err(LoanApplicationError::PageNotFound(page));
    }

    let offset = u64::from(page - 1) * u64::from(PAGE_SIZE);
    let slice = deps
        .loan_read_model
        .list(offset, PAGE_SIZE)
        .await
        .map_err(LoanApplicationError::ReadModelError)?;

    let total_pages = page_count(slice.total);
    if page > total_pages {
        return Err(LoanApplicationError::PageNotFound(page));
    }

    Ok(LoanPage {
        loans: slice.loans,
        page,
        total_pages,
        total_loans: slice.total,
    })
}

/// IDで貸出詳細を取得する
pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<LoanView> {
    deps.loan_read_model
        .get_by_id(loan_id)
        .await
        .map_err(LoanApplicationError::ReadModelError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

/// 削除前の確認情報を取得する（読み取り専用）
pub async fn confirm_delete(deps: &ServiceDependencies, loan_id: LoanId) -> Result<DeleteConfirmation> {
    let loan = get_loan(deps, loan_id).await?;
    let restores_stock = !loan.returned();
    Ok(DeleteConfirmation {
        loan,
        restores_stock,
    })
}
