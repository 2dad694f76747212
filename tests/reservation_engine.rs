//! Reservation engine tests against the in-memory store
//!
//! Concurrency tests run on a multi-threaded runtime so that spawned
//! reservations really race each other.

use booklend_server::{
    config::AppConfig,
    error::AppError,
    models::{AvailabilityStatus, Item, NewItem, ReturnFailureReason},
    repository::{Repository, ReservationStore},
    services::Services,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

struct Engine {
    repository: Repository,
    services: Services,
}

impl Engine {
    fn new() -> Self {
        let repository = Repository::in_memory();
        let services = Services::new(repository.clone(), &AppConfig::default());
        Self { repository, services }
    }

    async fn add_item(&self, title: &str, stock: i32) -> Item {
        self.repository
            .store
            .insert_item(&NewItem {
                title: title.to_string(),
                author: "Test Author".to_string(),
                shelf: "T-01".to_string(),
                category: "Testing".to_string(),
                image_url: None,
                stock,
            })
            .await
            .unwrap()
    }

    async fn item(&self, id: i32) -> Item {
        self.services.inventory.get_item(id).await.unwrap()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_copy_goes_to_exactly_one_borrower() {
    let engine = Engine::new();
    let item = engine.add_item("The Pragmatic Programmer", 1).await;
    let item_id = item.id;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let reservations = engine.services.reservations.clone();
            tokio::spawn(async move {
                reservations
                    .create_reservation(Uuid::new_v4(), item_id)
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut out_of_stock = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::OutOfStock(id)) => {
                assert_eq!(id, item.id);
                out_of_stock += 1;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(out_of_stock, 1);

    let item = engine.item(item.id).await;
    assert_eq!(item.available_stock, 0);
    assert_eq!(item.status, AvailabilityStatus::Unavailable);
    assert_eq!(item.reservation_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn stock_is_never_oversold_under_load() {
    let engine = Engine::new();
    let item = engine.add_item("Introduction to Algorithms", 5).await;
    let item_id = item.id;

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let reservations = engine.services.reservations.clone();
            tokio::spawn(async move {
                reservations
                    .create_reservation(Uuid::new_v4(), item_id)
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    let item = engine.item(item.id).await;
    assert_eq!(item.available_stock, 0);
    assert_eq!(item.reservation_count, 5);
}

#[tokio::test]
async fn third_loan_is_refused() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let first = engine.add_item("Clean Code", 3).await;
    let second = engine.add_item("Design Patterns", 3).await;
    let third = engine.add_item("Refactoring", 3).await;

    let reservations = &engine.services.reservations;
    reservations.create_reservation(borrower, first.id).await.unwrap();
    reservations.create_reservation(borrower, second.id).await.unwrap();

    let err = reservations
        .create_reservation(borrower, third.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LimitReached { limit: 2 }));
    assert_eq!(engine.item(third.id).await.available_stock, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_requests_from_one_borrower_respect_the_limit() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();

    let mut items = Vec::new();
    for i in 0..10 {
        items.push(engine.add_item(&format!("Book {i}"), 2).await);
    }

    // The borrower races against itself while others reserve the same items.
    let mut handles = Vec::new();
    for item in &items {
        let reservations = engine.services.reservations.clone();
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            (true, reservations.create_reservation(borrower, item_id).await)
        }));
        let reservations = engine.services.reservations.clone();
        handles.push(tokio::spawn(async move {
            (false, reservations.create_reservation(Uuid::new_v4(), item_id).await)
        }));
    }

    let mut borrower_successes = 0;
    for handle in handles {
        let (is_borrower, result) = handle.await.unwrap();
        if is_borrower {
            match result {
                Ok(_) => borrower_successes += 1,
                Err(AppError::LimitReached { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        } else {
            result.unwrap();
        }
    }

    assert_eq!(borrower_successes, 2);
    let active = engine
        .services
        .reservations
        .list_active_loans(borrower)
        .await
        .unwrap();
    assert_eq!(active.len(), 2);

    let mut remaining = 0;
    for item in &items {
        remaining += engine.item(item.id).await.available_stock;
    }
    // 10 other borrowers took one copy each, the borrower took two.
    assert_eq!(remaining, 20 - 10 - 2);
}

#[tokio::test]
async fn same_item_cannot_be_held_twice() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let item = engine.add_item("Clean Code", 3).await;

    engine
        .services
        .reservations
        .create_reservation(borrower, item.id)
        .await
        .unwrap();
    let err = engine
        .services
        .reservations
        .create_reservation(borrower, item.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateReservation(id) if id == item.id));
    assert_eq!(engine.item(item.id).await.available_stock, 2);
}

#[tokio::test]
async fn failed_reservation_leaves_no_trace() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let item = engine.add_item("Out of print", 0).await;

    let err = engine
        .services
        .reservations
        .create_reservation(borrower, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OutOfStock(_)));

    let err = engine
        .services
        .reservations
        .create_reservation(borrower, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ItemNotFound(9999)));

    assert_eq!(engine.item(item.id).await, item);
    assert!(engine
        .services
        .reservations
        .list_active_loans(borrower)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn return_restores_stock_and_erases_the_loan() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let item = engine.add_item("Clean Code", 1).await;
    let reservations = &engine.services.reservations;

    let loan = reservations.create_reservation(borrower, item.id).await.unwrap();
    assert_eq!(engine.item(item.id).await.status, AvailabilityStatus::Unavailable);

    let report = reservations
        .return_items(borrower, &[loan.id], "0000")
        .await
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.returned[0].loan_id, loan.id);

    let restored = engine.item(item.id).await;
    assert_eq!(restored.available_stock, 1);
    assert_eq!(restored.status, AvailabilityStatus::Available);
    assert!(reservations.list_active_loans(borrower).await.unwrap().is_empty());

    let again = reservations
        .return_items(borrower, &[loan.id], "0000")
        .await
        .unwrap();
    assert!(again.returned.is_empty());
    assert_eq!(again.failure_for(loan.id), Some(ReturnFailureReason::NotFound));
    assert_eq!(engine.item(item.id).await.available_stock, 1);
}

#[tokio::test]
async fn partial_batch_still_returns_the_valid_loan() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let first = engine.add_item("Clean Code", 1).await;
    let second = engine.add_item("Design Patterns", 1).await;
    let reservations = &engine.services.reservations;

    let loan_a = reservations.create_reservation(borrower, first.id).await.unwrap();
    let loan_b = reservations.create_reservation(borrower, second.id).await.unwrap();
    reservations
        .return_items(borrower, &[loan_b.id], "0000")
        .await
        .unwrap();

    let report = reservations
        .return_items(borrower, &[loan_a.id, loan_b.id], "0000")
        .await
        .unwrap();

    assert_eq!(report.returned.len(), 1);
    assert_eq!(report.returned[0].loan_id, loan_a.id);
    assert_eq!(report.failure_for(loan_b.id), Some(ReturnFailureReason::NotFound));
    assert_eq!(engine.item(first.id).await.available_stock, 1);
    assert_eq!(engine.item(second.id).await.available_stock, 1);
}

#[tokio::test]
async fn rejected_token_mutates_nothing() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let item = engine.add_item("Clean Code", 1).await;
    let reservations = &engine.services.reservations;

    let loan = reservations.create_reservation(borrower, item.id).await.unwrap();
    let before = engine.item(item.id).await;

    let err = reservations
        .return_items(borrower, &[loan.id], "1234")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthorizationFailed));

    assert_eq!(engine.item(item.id).await, before);
    let active = reservations.list_active_loans(borrower).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].loan, loan);
}

#[tokio::test]
async fn another_borrowers_loan_is_reported_not_owned() {
    let engine = Engine::new();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let item = engine.add_item("Clean Code", 1).await;
    let reservations = &engine.services.reservations;

    let loan = reservations.create_reservation(owner, item.id).await.unwrap();

    let report = reservations
        .return_items(intruder, &[loan.id], "0000")
        .await
        .unwrap();
    assert_eq!(report.failure_for(loan.id), Some(ReturnFailureReason::NotOwned));
    assert_eq!(engine.item(item.id).await.available_stock, 0);
    assert_eq!(reservations.list_active_loans(owner).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_returns_of_one_loan_succeed_once() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let item = engine.add_item("Clean Code", 1).await;

    let loan = engine
        .services
        .reservations
        .create_reservation(borrower, item.id)
        .await
        .unwrap();
    let loan_id = loan.id;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reservations = engine.services.reservations.clone();
            tokio::spawn(async move { reservations.return_items(borrower, &[loan_id], "0000").await })
        })
        .collect();

    let mut returned = 0;
    let mut not_found = 0;
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        returned += report.returned.len();
        if report.failure_for(loan_id) == Some(ReturnFailureReason::NotFound) {
            not_found += 1;
        }
    }

    assert_eq!(returned, 1);
    assert_eq!(not_found, 3);
    assert_eq!(engine.item(item.id).await.available_stock, 1);
}

#[tokio::test]
async fn dashboard_lists_newest_first_with_fines() {
    let engine = Engine::new();
    let borrower = Uuid::new_v4();
    let older = engine.add_item("Clean Code", 1).await;
    let newer = engine.add_item("Design Patterns", 1).await;
    let reservations = &engine.services.reservations;
    let now = Utc::now();

    // Reserved 32.5 days ago: deadline passed 2.5 days ago.
    reservations
        .create_reservation_at(borrower, older.id, now - Duration::hours(32 * 24 + 12))
        .await
        .unwrap();
    reservations
        .create_reservation_at(borrower, newer.id, now - Duration::days(1))
        .await
        .unwrap();

    let loans = reservations.list_active_loans_at(borrower, now).await.unwrap();

    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0].item.id, newer.id);
    assert_eq!(loans[0].fine, 0);
    assert_eq!(loans[0].days_remaining, 29);
    assert_eq!(loans[1].item.id, older.id);
    assert_eq!(loans[1].fine, 90);
}

#[tokio::test]
async fn catalog_filters_and_pages() {
    let engine = Engine::new();
    booklend_server::seed::seed_demo_catalog(engine.repository.store.as_ref())
        .await
        .unwrap();

    let (items, total) = engine
        .services
        .inventory
        .list_items(&booklend_server::models::ItemQuery {
            category: Some("Software Engineering".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(items.iter().all(|i| i.category == "Software Engineering"));

    let (page, total) = engine
        .services
        .inventory
        .list_items(&booklend_server::models::ItemQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);
}
