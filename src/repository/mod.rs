//! Repository layer for item and loan persistence

pub mod items;
pub mod loans;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        item::{Item, ItemQuery, NewItem},
        loan::{Loan, NewLoan},
    },
    services::limits::BorrowerLimitGuard,
};

/// Persistence for items and active loans.
///
/// `reserve` and `release` are the only writes to stock and loans, and each
/// call is one atomic unit: it either applies completely or leaves no trace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Check that storage is reachable
    async fn ping(&self) -> AppResult<()>;

    async fn get_item(&self, id: i32) -> AppResult<Option<Item>>;

    /// Filtered page of items plus the total match count
    async fn list_items(&self, query: &ItemQuery) -> AppResult<(Vec<Item>, i64)>;

    async fn insert_item(&self, item: &NewItem) -> AppResult<Item>;

    /// Check the borrower's limits, take one copy of the item and insert the
    /// loan.
    ///
    /// Errors: `LimitReached`, `DuplicateReservation`, `ItemNotFound`,
    /// `OutOfStock`.
    async fn reserve(&self, loan: NewLoan, guard: BorrowerLimitGuard) -> AppResult<Loan>;

    /// Return one copy of the loan's item and delete the loan. Returns the
    /// deleted loan.
    ///
    /// Errors: `LoanNotFound`, `NotOwned`, `ItemNotFound`.
    async fn release(&self, borrower_id: Uuid, loan_id: i32) -> AppResult<Loan>;

    /// Active loans with their items, most recent reservation first
    async fn borrower_loans(&self, borrower_id: Uuid) -> AppResult<Vec<(Loan, Item)>>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
    pub items: items::ItemsRepository,
    pub loans: loans::LoansRepository,
}

impl PostgresStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            items: items::ItemsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ReservationStore for PostgresStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_item(&self, id: i32) -> AppResult<Option<Item>> {
        self.items.get_by_id(id).await
    }

    async fn list_items(&self, query: &ItemQuery) -> AppResult<(Vec<Item>, i64)> {
        self.items.search(query).await
    }

    async fn insert_item(&self, item: &NewItem) -> AppResult<Item> {
        self.items.create(item).await
    }

    async fn reserve(&self, loan: NewLoan, guard: BorrowerLimitGuard) -> AppResult<Loan> {
        self.loans.reserve(&loan, guard).await
    }

    async fn release(&self, borrower_id: Uuid, loan_id: i32) -> AppResult<Loan> {
        self.loans.release(borrower_id, loan_id).await
    }

    async fn borrower_loans(&self, borrower_id: Uuid) -> AppResult<Vec<(Loan, Item)>> {
        self.loans.get_borrower_loans(borrower_id).await
    }
}

/// Main repository struct holding the active store
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn ReservationStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_store(PostgresStore::new(pool))
    }

    /// Repository backed by process memory
    pub fn in_memory() -> Self {
        Self::with_store(memory::MemoryStore::new())
    }

    pub fn with_store(store: impl ReservationStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
