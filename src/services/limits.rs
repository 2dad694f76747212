//! Borrower limit guard

use crate::error::{AppError, AppResult};

/// Caps simultaneous loans per borrower and forbids holding two loans of
/// the same item.
///
/// The check is only meaningful when evaluated inside the same storage
/// transaction that inserts the loan, with the borrower locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowerLimitGuard {
    max_active_loans: u32,
}

impl BorrowerLimitGuard {
    pub const DEFAULT_MAX_ACTIVE_LOANS: u32 = 2;

    pub fn new(max_active_loans: u32) -> Self {
        Self { max_active_loans }
    }

    pub fn max_active_loans(&self) -> u32 {
        self.max_active_loans
    }

    /// `held_item_ids` are the items of the borrower's current loans
    pub fn check_can_reserve(&self, held_item_ids: &[i32], item_id: i32) -> AppResult<()> {
        if held_item_ids.len() >= self.max_active_loans as usize {
            return Err(AppError::LimitReached {
                limit: self.max_active_loans,
            });
        }
        if held_item_ids.contains(&item_id) {
            return Err(AppError::DuplicateReservation(item_id));
        }
        Ok(())
    }
}

impl Default for BorrowerLimitGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ACTIVE_LOANS)
    }
}
