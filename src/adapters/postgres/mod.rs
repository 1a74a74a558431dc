pub mod book_catalog;
pub mod borrower_directory;
pub mod loan_read_model;
pub mod loan_store;

// パブリックに型を再エクスポート
pub use book_catalog::BookCatalog as PostgresBookCatalog;
pub use borrower_directory::BorrowerDirectory as PostgresBorrowerDirectory;
pub use loan_read_model::LoanReadModel as PostgresLoanReadModel;
pub use loan_store::LoanStore as PostgresLoanStore;
