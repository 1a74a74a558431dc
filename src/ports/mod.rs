pub mod book_catalog;
pub mod borrower_directory;
pub mod loan_read_model;
pub mod loan_store;

pub use book_catalog::BookCatalog;
pub use borrower_directory::BorrowerDirectory;
pub use loan_read_model::{LoanReadModel, LoanSlice, LoanStatus, LoanView};
pub use loan_store::{LoanStore, LoanTransaction};
