//! Item (catalog book) model and related types.
//!
//! Stock fields are only ever changed through the inventory ledger
//! (`services::inventory`) inside a storage transaction. `status` is stored
//! next to `available_stock` but is always derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Whether at least one copy can currently be reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "availability_status", rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[serde(alias = "available")]
    Available,
    #[serde(alias = "unavailable")]
    Unavailable,
}

impl AvailabilityStatus {
    /// Status implied by a stock level
    pub fn for_stock(available_stock: i32) -> Self {
        if available_stock > 0 {
            AvailabilityStatus::Available
        } else {
            AvailabilityStatus::Unavailable
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "Available"),
            AvailabilityStatus::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// Item model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Shelf location, e.g. "A-12"
    pub shelf: String,
    pub category: String,
    pub image_url: Option<String>,
    pub available_stock: i32,
    pub status: AvailabilityStatus,
    /// All-time reservations, informational only
    pub reservation_count: i32,
    pub created_at: DateTime<Utc>,
}

/// New catalog entry (seeding / catalog administration)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewItem {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Shelf is required"))]
    pub shelf: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub image_url: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}

/// Item listing filters
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    /// Case-insensitive match on title, author, category or shelf
    #[validate(length(max = 200))]
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub shelf: Option<String>,
    pub status: Option<AvailabilityStatus>,
    #[validate(range(min = 1, max = 100_000))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<i64>,
}

impl ItemQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }

    /// Keyword trimmed, lowercased, `None` when blank
    pub fn normalized_keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase)
    }

    /// In-process filter, equivalent to the SQL built by the Postgres store
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(keyword) = self.normalized_keyword() {
            let hit = [&item.title, &item.author, &item.category, &item.shelf]
                .iter()
                .any(|field| field.to_lowercase().contains(&keyword));
            if !hit {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if &item.category != category {
                return false;
            }
        }
        if let Some(ref shelf) = self.shelf {
            if &item.shelf != shelf {
                return false;
            }
        }
        match self.status {
            Some(status) => item.status == status,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, category: &str, shelf: &str, stock: i32) -> Item {
        Item {
            id: 1,
            title: title.to_string(),
            author: "Robert C. Martin".to_string(),
            shelf: shelf.to_string(),
            category: category.to_string(),
            image_url: None,
            available_stock: stock,
            status: AvailabilityStatus::for_stock(stock),
            reservation_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_follows_stock() {
        assert_eq!(AvailabilityStatus::for_stock(0), AvailabilityStatus::Unavailable);
        assert_eq!(AvailabilityStatus::for_stock(3), AvailabilityStatus::Available);
    }

    #[test]
    fn keyword_matches_any_text_field_case_insensitively() {
        let clean_code = item("Clean Code", "Software Engineering", "C-01", 1);

        let by_author = ItemQuery { keyword: Some("martin".into()), ..Default::default() };
        let by_shelf = ItemQuery { keyword: Some(" c-01 ".into()), ..Default::default() };
        let miss = ItemQuery { keyword: Some("algorithms".into()), ..Default::default() };

        assert!(by_author.matches(&clean_code));
        assert!(by_shelf.matches(&clean_code));
        assert!(!miss.matches(&clean_code));
    }

    #[test]
    fn filters_combine() {
        let out_of_stock = item("Clean Code", "Software Engineering", "C-01", 0);
        let query = ItemQuery {
            category: Some("Software Engineering".into()),
            status: Some(AvailabilityStatus::Available),
            ..Default::default()
        };
        assert!(!query.matches(&out_of_stock));

        let query = ItemQuery {
            shelf: Some("C-01".into()),
            status: Some(AvailabilityStatus::Unavailable),
            ..Default::default()
        };
        assert!(query.matches(&out_of_stock));
    }

    #[test]
    fn pagination_defaults() {
        let query = ItemQuery { page: Some(3), ..Default::default() };
        assert_eq!(query.per_page(), 20);
        assert_eq!(query.offset(), 40);
        assert!(ItemQuery { per_page: Some(500), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn huge_page_is_rejected_and_never_overflows() {
        let query = ItemQuery { page: Some(i64::MAX), ..Default::default() };
        assert!(query.validate().is_err());
        assert_eq!(query.offset(), i64::MAX);

        let last = ItemQuery { page: Some(100_000), per_page: Some(100), ..Default::default() };
        assert!(last.validate().is_ok());
        assert_eq!(last.offset(), 9_999_900);
    }
}
