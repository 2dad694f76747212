//! Data models for Booklend

pub mod borrower;
pub mod item;
pub mod loan;

// Re-export commonly used types
pub use borrower::BorrowerClaims;
pub use item::{AvailabilityStatus, Item, ItemQuery, NewItem};
pub use loan::{
    FailedReturn, Loan, LoanDetails, LoanStatus, NewLoan, ReturnFailureReason, ReturnReport,
    ReturnedLoan,
};
