use crate::domain::value_objects::BorrowerId;
use crate::ports::borrower_directory::{BorrowerDirectory as BorrowerDirectoryTrait, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Mock implementation of BorrowerDirectory
///
/// Supports stateful testing by storing borrower IDs.
pub struct BorrowerDirectory {
    known_borrowers: Mutex<HashSet<BorrowerId>>,
}

impl BorrowerDirectory {
    pub fn new() -> Self {
        Self {
            known_borrowers: Mutex::new(HashSet::new()),
        }
    }

    /// Register a borrower for testing purposes
    pub fn add_borrower(&self, borrower_id: BorrowerId) {
        self.known_borrowers.lock().insert(borrower_id);
    }
}

impl Default for BorrowerDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BorrowerDirectoryTrait for BorrowerDirectory {
    /// Check if the borrower was registered
    async fn exists(&self, borrower_id: BorrowerId) -> Result<bool> {
        Ok(self.known_borrowers.lock().contains(&borrower_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_registered_borrowers_exist() {
        let directory = BorrowerDirectory::new();
        let alice = BorrowerId::new();
        directory.add_borrower(alice);

        assert!(directory.exists(alice).await.unwrap());
        assert!(!directory.exists(BorrowerId::new()).await.unwrap());
    }
}
