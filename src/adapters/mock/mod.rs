pub mod borrower_directory;

pub use borrower_directory::BorrowerDirectory;
