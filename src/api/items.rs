//! Item (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::item::{Item, ItemQuery},
};

use super::AuthenticatedBorrower;

/// One page of catalog items
#[derive(Serialize, ToSchema)]
pub struct ItemPage {
    /// List of items
    pub items: Vec<Item>,
    /// Total number of matching items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// List items with search and pagination
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    security(("bearer_auth" = [])),
    params(ItemQuery),
    responses(
        (status = 200, description = "List of items", body = ItemPage),
        (status = 400, description = "Invalid filters"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<ItemPage>> {
    query.validate()?;

    let (items, total) = state.services.inventory.list_items(&query).await?;

    Ok(Json(ItemPage {
        items,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<i32>,
) -> AppResult<Json<Item>> {
    let item = state.services.inventory.get_item(id).await?;
    Ok(Json(item))
}
