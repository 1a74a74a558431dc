use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 貸出ID - 貸出記録の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - 蔵書在庫への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 利用者ID - 外部の利用者台帳への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowerId(Uuid);

impl BorrowerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BorrowerId {
    fn default() -> Self {
        Self::new()
    }
}

/// 在庫数エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    /// 在庫が0のため貸し出せない
    Exhausted,
    /// 負の値からは在庫を作れない
    Negative(i64),
}

/// 在庫数（貸出可能な冊数）
///
/// 不変条件：在庫は負にならない。
/// 型システムでこの制約を強制し、0から減らす操作はエラーになる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stock(u32);

impl Stock {
    pub fn new(copies: u32) -> Self {
        Self(copies)
    }

    /// 1冊貸し出した後の在庫
    ///
    /// # エラー
    /// 在庫が0の場合は`StockError::Exhausted`を返す
    pub fn take_one(self) -> Result<Self, StockError> {
        match self.0.checked_sub(1) {
            Some(remaining) => Ok(Self(remaining)),
            None => Err(StockError::Exhausted),
        }
    }

    /// 1冊戻った後の在庫
    pub fn put_back(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_available(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<i64> for Stock {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| StockError::Negative(value))
    }
}

impl TryFrom<i32> for Stock {
    type Error = StockError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}
