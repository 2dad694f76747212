//! Loan (reservation) model and related types
//!
//! A loan row exists only while the loan is active. Returning deletes it;
//! no history is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::item::Item;

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub borrower_id: Uuid,
    pub item_id: i32,
    pub reserved_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

/// Loan about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub borrower_id: Uuid,
    pub item_id: i32,
    pub reserved_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

/// Display status, computed on read and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Reserved,
    Late,
}

/// Active loan joined with its item, for the borrower dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub loan: Loan,
    pub item: Item,
    /// Overdue fine at read time
    pub fine: i64,
    pub status: LoanStatus,
    /// Whole days until the deadline, rounded up; negative once overdue
    pub days_remaining: i64,
}

/// Why a loan id in a return batch was not returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnFailureReason {
    /// No such loan, or it was already returned
    NotFound,
    /// The loan belongs to another borrower
    NotOwned,
    /// The loan's item no longer exists; the loan is kept
    ItemMissing,
    /// Storage failed while processing this id
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReturnedLoan {
    pub loan_id: i32,
    pub item_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedReturn {
    pub loan_id: i32,
    pub reason: ReturnFailureReason,
}

/// Outcome of a batch return. Each id is its own transaction, so both lists
/// may be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReturnReport {
    pub returned: Vec<ReturnedLoan>,
    pub failed: Vec<FailedReturn>,
}

impl ReturnReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failure_for(&self, loan_id: i32) -> Option<ReturnFailureReason> {
        self.failed
            .iter()
            .find(|f| f.loan_id == loan_id)
            .map(|f| f.reason)
    }
}
