//! Reservation lifecycle: create loans, return them, list them

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexSet;
use uuid::Uuid;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{
        FailedReturn, Loan, LoanDetails, LoanStatus, NewLoan, ReturnFailureReason, ReturnReport,
        ReturnedLoan,
    },
    repository::Repository,
};

use super::{fines::FineCalculator, limits::BorrowerLimitGuard, return_gate::ReturnAuthorizationGate};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    guard: BorrowerLimitGuard,
    loan_period: Duration,
    fines: FineCalculator,
    gate: ReturnAuthorizationGate,
}

impl ReservationsService {
    pub fn new(repository: Repository, loans: &LoansConfig, gate: ReturnAuthorizationGate) -> Self {
        Self {
            repository,
            guard: BorrowerLimitGuard::new(loans.max_active_loans),
            loan_period: Duration::days(loans.loan_period_days),
            fines: FineCalculator::new(loans.fine_per_day),
            gate,
        }
    }

    /// Reserve one copy of an item for a borrower
    pub async fn create_reservation(&self, borrower_id: Uuid, item_id: i32) -> AppResult<Loan> {
        self.create_reservation_at(borrower_id, item_id, Utc::now()).await
    }

    /// Reserve with an explicit clock; the deadline is `now` plus the loan period
    pub async fn create_reservation_at(
        &self,
        borrower_id: Uuid,
        item_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let new_loan = NewLoan {
            borrower_id,
            item_id,
            reserved_at: now,
            deadline: now + self.loan_period,
        };

        match self.repository.store.reserve(new_loan, self.guard).await {
            Ok(loan) => {
                tracing::info!(
                    loan_id = loan.id,
                    item_id,
                    %borrower_id,
                    deadline = %loan.deadline,
                    "Reservation created"
                );
                Ok(loan)
            }
            Err(e) => {
                if e.is_unavailable() {
                    tracing::error!("Reservation of item {} failed: {}", item_id, e);
                } else {
                    tracing::debug!("Reservation of item {} rejected: {}", item_id, e);
                }
                Err(e)
            }
        }
    }

    /// Return a batch of loans after checking the desk verification token.
    ///
    /// A rejected token fails the whole batch before anything is touched.
    /// Otherwise each id is returned in its own transaction and the report
    /// lists what succeeded and what did not.
    pub async fn return_items(
        &self,
        borrower_id: Uuid,
        loan_ids: &[i32],
        verification_token: &str,
    ) -> AppResult<ReturnReport> {
        if loan_ids.is_empty() {
            return Err(AppError::EmptyRequest);
        }

        if let Err(e) = self.gate.require(verification_token) {
            tracing::warn!(
                %borrower_id,
                loans = loan_ids.len(),
                "Return batch rejected: verification token mismatch"
            );
            return Err(e);
        }

        Ok(self.return_loans(borrower_id, loan_ids).await)
    }

    async fn return_loans(&self, borrower_id: Uuid, loan_ids: &[i32]) -> ReturnReport {
        let unique: IndexSet<i32> = loan_ids.iter().copied().collect();
        let mut report = ReturnReport::default();

        for loan_id in unique {
            match self.repository.store.release(borrower_id, loan_id).await {
                Ok(loan) => {
                    tracing::info!(loan_id, item_id = loan.item_id, %borrower_id, "Loan returned");
                    report.returned.push(ReturnedLoan {
                        loan_id,
                        item_id: loan.item_id,
                    });
                }
                Err(e) => {
                    let reason = match e {
                        AppError::LoanNotFound(_) => ReturnFailureReason::NotFound,
                        AppError::NotOwned(_) => ReturnFailureReason::NotOwned,
                        AppError::ItemNotFound(item_id) => {
                            tracing::warn!("Loan {} references missing item {}", loan_id, item_id);
                            ReturnFailureReason::ItemMissing
                        }
                        other => {
                            tracing::error!("Return of loan {} failed: {}", loan_id, other);
                            ReturnFailureReason::Unavailable
                        }
                    };
                    report.failed.push(FailedReturn { loan_id, reason });
                }
            }
        }

        report
    }

    /// Active loans for the dashboard, with fines computed now
    pub async fn list_active_loans(&self, borrower_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        self.list_active_loans_at(borrower_id, Utc::now()).await
    }

    pub async fn list_active_loans_at(
        &self,
        borrower_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<LoanDetails>> {
        let loans = self.repository.store.borrower_loans(borrower_id).await?;

        Ok(loans
            .into_iter()
            .map(|(loan, item)| {
                let fine = self.fines.compute(loan.deadline, now);
                LoanDetails {
                    days_remaining: self.fines.days_remaining(loan.deadline, now),
                    status: if fine > 0 {
                        LoanStatus::Late
                    } else {
                        LoanStatus::Reserved
                    },
                    fine,
                    loan,
                    item,
                }
            })
            .collect())
    }
}
