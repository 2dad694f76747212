//! Loans repository for database operations
//!
//! Reserve and release each run as one transaction. The borrower is
//! serialized first with a transaction-scoped advisory lock, then the item
//! row is locked with `FOR UPDATE`. Both operations take the locks in that
//! order.

use sqlx::{PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        item::Item,
        loan::{Loan, NewLoan},
    },
    services::{inventory, limits::BorrowerLimitGuard},
};

use super::items::ItemsRepository;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Serialize all loan mutations of one borrower until commit/rollback
    async fn lock_borrower(conn: &mut PgConnection, borrower_id: Uuid) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(borrower_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Items currently held by a borrower
    async fn held_item_ids(conn: &mut PgConnection, borrower_id: Uuid) -> AppResult<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>("SELECT item_id FROM loans WHERE borrower_id = $1")
            .bind(borrower_id)
            .fetch_all(conn)
            .await?;
        Ok(ids)
    }

    /// Check limits, take a copy and insert the loan, all or nothing
    pub async fn reserve(&self, new_loan: &NewLoan, guard: BorrowerLimitGuard) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        Self::lock_borrower(&mut tx, new_loan.borrower_id).await?;

        let held = Self::held_item_ids(&mut tx, new_loan.borrower_id).await?;
        guard.check_can_reserve(&held, new_loan.item_id)?;

        let mut item = ItemsRepository::lock_for_update(&mut tx, new_loan.item_id)
            .await?
            .ok_or(AppError::ItemNotFound(new_loan.item_id))?;
        inventory::decrement_stock(&mut item)?;
        ItemsRepository::write_stock(&mut tx, &item).await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (borrower_id, item_id, reserved_at, deadline)
            VALUES ($1, $2, $3, $4)
            RETURNING id, borrower_id, item_id, reserved_at, deadline
            "#,
        )
        .bind(new_loan.borrower_id)
        .bind(new_loan.item_id)
        .bind(new_loan.reserved_at)
        .bind(new_loan.deadline)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Put the copy back and delete the loan, all or nothing
    pub async fn release(&self, borrower_id: Uuid, loan_id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        Self::lock_borrower(&mut tx, borrower_id).await?;

        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, borrower_id, item_id, reserved_at, deadline FROM loans WHERE id = $1 FOR UPDATE",
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::LoanNotFound(loan_id))?;

        if loan.borrower_id != borrower_id {
            return Err(AppError::NotOwned(loan_id));
        }

        let mut item = ItemsRepository::lock_for_update(&mut tx, loan.item_id)
            .await?
            .ok_or(AppError::ItemNotFound(loan.item_id))?;
        inventory::increment_stock(&mut item);
        ItemsRepository::write_stock(&mut tx, &item).await?;

        let deleted = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(loan_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted != 1 {
            return Err(AppError::LoanNotFound(loan_id));
        }

        tx.commit().await?;

        Ok(loan)
    }

    /// Active loans of a borrower joined with their items, newest first
    pub async fn get_borrower_loans(&self, borrower_id: Uuid) -> AppResult<Vec<(Loan, Item)>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.borrower_id, l.item_id, l.reserved_at, l.deadline,
                   i.title, i.author, i.shelf, i.category, i.image_url,
                   i.available_stock, i.status, i.reservation_count, i.created_at
            FROM loans l
            JOIN items i ON i.id = l.item_id
            WHERE l.borrower_id = $1
            ORDER BY l.reserved_at DESC, l.id DESC
            "#,
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let loan = Loan {
                id: row.get("id"),
                borrower_id: row.get("borrower_id"),
                item_id: row.get("item_id"),
                reserved_at: row.get("reserved_at"),
                deadline: row.get("deadline"),
            };
            let item = Item {
                id: loan.item_id,
                title: row.get("title"),
                author: row.get("author"),
                shelf: row.get("shelf"),
                category: row.get("category"),
                image_url: row.get("image_url"),
                available_stock: row.get("available_stock"),
                status: row.get("status"),
                reservation_count: row.get("reservation_count"),
                created_at: row.get("created_at"),
            };
            result.push((loan, item));
        }

        Ok(result)
    }
}
