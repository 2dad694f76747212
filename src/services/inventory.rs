//! Inventory ledger and catalog reads
//!
//! `decrement_stock` / `increment_stock` are the only functions allowed to
//! change an item's stock. They operate on an item row that the caller has
//! already locked inside a storage transaction, and they recompute
//! `status` in the same step so it never diverges from `available_stock`.

use crate::{
    error::{AppError, AppResult},
    models::item::{AvailabilityStatus, Item, ItemQuery},
    repository::Repository,
};

/// Take one copy off the shelf.
///
/// Fails with `OutOfStock` without touching the item when no copy is left.
pub fn decrement_stock(item: &mut Item) -> AppResult<()> {
    if item.available_stock <= 0 {
        return Err(AppError::OutOfStock(item.id));
    }
    item.available_stock -= 1;
    item.reservation_count += 1;
    item.status = AvailabilityStatus::for_stock(item.available_stock);
    Ok(())
}

/// Put one copy back on the shelf
pub fn increment_stock(item: &mut Item) {
    item.available_stock += 1;
    item.status = AvailabilityStatus::for_stock(item.available_stock);
}

/// Read-only catalog access
#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search items with filters
    pub async fn list_items(&self, query: &ItemQuery) -> AppResult<(Vec<Item>, i64)> {
        self.repository.store.list_items(query).await
    }

    /// Get item by ID
    pub async fn get_item(&self, id: i32) -> AppResult<Item> {
        self.repository
            .store
            .get_item(id)
            .await?
            .ok_or(AppError::ItemNotFound(id))
    }
}
