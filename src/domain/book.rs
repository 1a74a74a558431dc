use serde::{Deserialize, Serialize};

use super::{BookId, Stock};

/// 蔵書 - 1タイトル分の在庫
///
/// 在庫数は貸出の作成・返却・削除によってのみ変化する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub stock: Stock,
}

impl Book {
    pub fn new(title: impl Into<String>, stock: Stock) -> Self {
        Self {
            book_id: BookId::new(),
            title: title.into(),
            stock,
        }
    }

    /// 在庫を1冊戻した蔵書
    pub fn restocked(&self) -> Self {
        Self {
            stock: self.stock.put_back(),
            ..self.clone()
        }
    }
}
