mod errors;
mod inventory;
mod loan_service;
mod notice;
mod queries;

pub use errors::{LoanApplicationError, Result};
pub use inventory::{MAX_STOCK, get_book, register_book};
pub use loan_service::{
    DeletedLoan, ReturnOutcome, ServiceDependencies, create_loan, delete_loan, mark_returned,
};
pub use notice::{Notice, NoticeLevel, Outcome};
pub use queries::{DeleteConfirmation, LoanPage, PAGE_SIZE, confirm_delete, get_loan, list_loans};
