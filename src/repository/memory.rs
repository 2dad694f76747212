//! In-process store
//!
//! Lock order matches the Postgres store: the borrower's async mutex first,
//! then the item's map entry. No `.await` happens while an item entry is
//! held, so entry guards never cross a suspension point.
//!
//! Borrower mutexes are created on first use and never evicted, so
//! `borrower_locks` grows with every distinct borrower id seen. This backend
//! is meant for development and tests, not long-running deployments.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{AvailabilityStatus, Item, ItemQuery, NewItem},
        loan::{Loan, NewLoan},
    },
    services::{inventory, limits::BorrowerLimitGuard},
};

use super::ReservationStore;

#[derive(Default)]
pub struct MemoryStore {
    items: DashMap<i32, Item>,
    loans: DashMap<i32, Loan>,
    /// Loan ids per borrower, kept in step with `loans`
    by_borrower: DashMap<Uuid, Vec<i32>>,
    borrower_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    next_item_id: AtomicI32,
    next_loan_id: AtomicI32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn borrower_lock(&self, borrower_id: Uuid) -> Arc<Mutex<()>> {
        self.borrower_locks
            .entry(borrower_id)
            .or_default()
            .value()
            .clone()
    }

    fn held_item_ids(&self, borrower_id: Uuid) -> Vec<i32> {
        self.by_borrower
            .get(&borrower_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.loans.get(id).map(|loan| loan.item_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn get_item(&self, id: i32) -> AppResult<Option<Item>> {
        Ok(self.items.get(&id).map(|item| item.clone()))
    }

    async fn list_items(&self, query: &ItemQuery) -> AppResult<(Vec<Item>, i64)> {
        let mut matching: Vec<Item> = self
            .items
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset().max(0) as usize)
            .take(query.per_page().max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn insert_item(&self, item: &NewItem) -> AppResult<Item> {
        let id = self.next_item_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Item {
            id,
            title: item.title.clone(),
            author: item.author.clone(),
            shelf: item.shelf.clone(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
            available_stock: item.stock,
            status: AvailabilityStatus::for_stock(item.stock),
            reservation_count: 0,
            created_at: Utc::now(),
        };
        self.items.insert(id, created.clone());
        Ok(created)
    }

    async fn reserve(&self, new_loan: NewLoan, guard: BorrowerLimitGuard) -> AppResult<Loan> {
        let lock = self.borrower_lock(new_loan.borrower_id);
        let _borrower = lock.lock().await;

        let held = self.held_item_ids(new_loan.borrower_id);
        guard.check_can_reserve(&held, new_loan.item_id)?;

        let mut item = self
            .items
            .get_mut(&new_loan.item_id)
            .ok_or(AppError::ItemNotFound(new_loan.item_id))?;
        inventory::decrement_stock(&mut item)?;

        let loan = Loan {
            id: self.next_loan_id.fetch_add(1, Ordering::SeqCst) + 1,
            borrower_id: new_loan.borrower_id,
            item_id: new_loan.item_id,
            reserved_at: new_loan.reserved_at,
            deadline: new_loan.deadline,
        };
        self.loans.insert(loan.id, loan.clone());
        self.by_borrower
            .entry(loan.borrower_id)
            .or_default()
            .push(loan.id);

        Ok(loan)
    }

    async fn release(&self, borrower_id: Uuid, loan_id: i32) -> AppResult<Loan> {
        let lock = self.borrower_lock(borrower_id);
        let _borrower = lock.lock().await;

        let loan = self
            .loans
            .get(&loan_id)
            .map(|loan| loan.clone())
            .ok_or(AppError::LoanNotFound(loan_id))?;
        if loan.borrower_id != borrower_id {
            return Err(AppError::NotOwned(loan_id));
        }

        let mut item = self
            .items
            .get_mut(&loan.item_id)
            .ok_or(AppError::ItemNotFound(loan.item_id))?;

        // Only the owner can delete, and the owner is locked out, so the loan
        // is still here.
        let (_, loan) = self
            .loans
            .remove(&loan_id)
            .ok_or(AppError::LoanNotFound(loan_id))?;
        inventory::increment_stock(&mut item);
        if let Some(mut ids) = self.by_borrower.get_mut(&borrower_id) {
            ids.retain(|id| *id != loan_id);
        }

        Ok(loan)
    }

    async fn borrower_loans(&self, borrower_id: Uuid) -> AppResult<Vec<(Loan, Item)>> {
        let ids = self
            .by_borrower
            .get(&borrower_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();

        let mut result: Vec<(Loan, Item)> = ids
            .iter()
            .filter_map(|id| self.loans.get(id).map(|loan| loan.clone()))
            .filter_map(|loan| {
                let item = self.items.get(&loan.item_id)?.clone();
                Some((loan, item))
            })
            .collect();
        result.sort_by(|(a, _), (b, _)| b.reserved_at.cmp(&a.reserved_at).then(b.id.cmp(&a.id)));

        Ok(result)
    }
}
