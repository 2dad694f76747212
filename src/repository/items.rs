//! Items repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::item::{AvailabilityStatus, Item, ItemQuery, NewItem},
};

const ITEM_COLUMNS: &str = "id, title, author, shelf, category, image_url, \
     available_stock, status, reservation_count, created_at";

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Search items with pagination
    pub async fn search(&self, query: &ItemQuery) -> AppResult<(Vec<Item>, i64)> {
        let mut conditions = vec!["1=1".to_string()];
        let mut binds: Vec<String> = Vec::new();

        if let Some(keyword) = query.normalized_keyword() {
            binds.push(format!("%{}%", keyword));
            let n = binds.len();
            conditions.push(format!(
                "(LOWER(title) LIKE ${n} OR LOWER(author) LIKE ${n} \
                 OR LOWER(category) LIKE ${n} OR LOWER(shelf) LIKE ${n})"
            ));
        }

        if let Some(ref category) = query.category {
            binds.push(category.clone());
            conditions.push(format!("category = ${}", binds.len()));
        }

        if let Some(ref shelf) = query.shelf {
            binds.push(shelf.clone());
            conditions.push(format!("shelf = ${}", binds.len()));
        }

        match query.status {
            Some(AvailabilityStatus::Available) => conditions.push("status = 'available'".to_string()),
            Some(AvailabilityStatus::Unavailable) => {
                conditions.push("status = 'unavailable'".to_string())
            }
            None => {}
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM items WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for value in &binds {
            count = count.bind(value);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT {} FROM items WHERE {} ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
            ITEM_COLUMNS,
            where_clause,
            query.per_page(),
            query.offset()
        );
        let mut select = sqlx::query_as::<_, Item>(&select_query);
        for value in &binds {
            select = select.bind(value);
        }
        let items = select.fetch_all(&self.pool).await?;

        Ok((items, total))
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Insert a catalog entry, deriving its status from the initial stock
    pub async fn create(&self, item: &NewItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (title, author, shelf, category, image_url, available_stock, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&item.title)
        .bind(&item.author)
        .bind(&item.shelf)
        .bind(&item.category)
        .bind(&item.image_url)
        .bind(item.stock)
        .bind(AvailabilityStatus::for_stock(item.stock))
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    // =========================================================================
    // TRANSACTIONAL (caller owns the transaction)
    // =========================================================================

    /// Lock an item row until the surrounding transaction ends
    pub async fn lock_for_update(conn: &mut PgConnection, id: i32) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE id = $1 FOR UPDATE",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(item)
    }

    /// Persist the stock fields of a locked item
    pub async fn write_stock(conn: &mut PgConnection, item: &Item) -> AppResult<()> {
        sqlx::query(
            "UPDATE items SET available_stock = $2, status = $3, reservation_count = $4 WHERE id = $1",
        )
        .bind(item.id)
        .bind(item.available_stock)
        .bind(item.status)
        .bind(item.reservation_count)
        .execute(conn)
        .await?;
        Ok(())
    }
}
