//! Demo catalog used by the `seed` binary and the memory backend

use crate::{
    error::AppResult,
    models::item::NewItem,
    repository::ReservationStore,
};

/// (title, author, shelf, category, stock)
const DEMO_BOOKS: &[(&str, &str, &str, &str, i32)] = &[
    ("The Pragmatic Programmer", "Andrew Hunt", "A-12", "Computer Science", 1),
    ("Introduction to Algorithms", "Thomas H. Cormen", "B-04", "Algorithms", 3),
    ("Design Patterns", "Erich Gamma", "A-08", "Software Engineering", 2),
    ("Clean Code", "Robert C. Martin", "C-01", "Software Engineering", 1),
    (
        "Artificial Intelligence: A Modern Approach",
        "Stuart Russell",
        "D-15",
        "AI & Data Science",
        2,
    ),
];

pub fn demo_catalog() -> Vec<NewItem> {
    DEMO_BOOKS
        .iter()
        .map(|&(title, author, shelf, category, stock)| NewItem {
            title: title.to_string(),
            author: author.to_string(),
            shelf: shelf.to_string(),
            category: category.to_string(),
            image_url: None,
            stock,
        })
        .collect()
}

/// Insert the demo catalog, returning how many items were created
pub async fn seed_demo_catalog(store: &dyn ReservationStore) -> AppResult<usize> {
    let books = demo_catalog();
    for book in &books {
        store.insert_item(book).await?;
    }
    tracing::info!("Seeded {} demo items", books.len());
    Ok(books.len())
}
