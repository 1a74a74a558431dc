//! PostgreSQLアダプターのテスト
//!
//! DATABASE_URLのデータベースが必要なため通常は無視される。
//! `cargo test -- --ignored` で実行する。

mod common;

use chrono::{NaiveDate, Utc};
use loan_stock_manager::adapters::postgres::{
    PostgresBookCatalog, PostgresBorrowerDirectory, PostgresLoanReadModel, PostgresLoanStore,
};
use loan_stock_manager::application::loan::{
    LoanApplicationError, ServiceDependencies, create_loan, delete_loan, mark_returned,
};
use loan_stock_manager::domain::commands::*;
use loan_stock_manager::domain::{self, Book, BookId, BorrowerId, Stock};
use loan_stock_manager::ports::{
    BookCatalog, BorrowerDirectory, LoanReadModel, LoanStatus, LoanStore, LoanTransaction,
};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// データベースのクリーンアップ
///
/// テストの独立性を保つため、各テスト前にすべてのデータを削除します。
async fn cleanup_database(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE loans, books, borrowers CASCADE")
        .execute(pool)
        .await
        .expect("Failed to truncate tables");
}

async fn setup(pool: &PgPool) -> ServiceDependencies {
    cleanup_database(pool).await;

    ServiceDependencies {
        loan_store: Arc::new(PostgresLoanStore::new(pool.clone())),
        loan_read_model: Arc::new(PostgresLoanReadModel::new(pool.clone())),
        book_catalog: Arc::new(PostgresBookCatalog::new(pool.clone())),
        borrower_directory: Arc::new(PostgresBorrowerDirectory::new(pool.clone())),
    }
}

async fn insert_borrower(pool: &PgPool, name: &str) -> BorrowerId {
    let borrower_id = BorrowerId::new();
    sqlx::query("INSERT INTO borrowers (borrower_id, name) VALUES ($1, $2)")
        .bind(borrower_id.value())
        .bind(name)
        .execute(pool)
        .await
        .expect("Failed to insert borrower");
    borrower_id
}

async fn insert_book(deps: &ServiceDependencies, title: &str, stock: u32) -> BookId {
    let book = Book::new(title, Stock::new(stock));
    let book_id = book.book_id;
    deps.book_catalog.add(book).await.expect("Failed to add book");
    book_id
}

async fn stock_of(deps: &ServiceDependencies, book_id: BookId) -> u32 {
    deps.book_catalog
        .get_by_id(book_id)
        .await
        .unwrap()
        .unwrap()
        .stock
        .value()
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_postgres_dune_scenario() {
    let pool = common::create_test_pool().await;
    let deps = setup(&pool).await;
    let alice = insert_borrower(&pool, "Alice").await;
    let bob = insert_borrower(&pool, "Bob").await;
    let dune = insert_book(&deps, "Dune", 1).await;

    let loan = create_loan(
        &deps,
        CreateLoan {
            book_id: dune,
            borrower_id: alice,
            loaned_at: Utc::now(),
        },
    )
    .await
    .unwrap()
    .value;
    assert_eq!(stock_of(&deps, dune).await, 0);

    let rejected = create_loan(
        &deps,
        CreateLoan {
            book_id: dune,
            borrower_id: bob,
            loaned_at: Utc::now(),
        },
    )
    .await;
    assert!(matches!(
        rejected,
        Err(LoanApplicationError::OutOfStock { .. })
    ));

    let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    mark_returned(
        &deps,
        MarkReturned {
            loan_id: loan.loan_id,
            returned_on: today,
        },
    )
    .await
    .unwrap();
    assert_eq!(stock_of(&deps, dune).await, 1);

    let view = deps
        .loan_read_model
        .get_by_id(loan.loan_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.status(), LoanStatus::Returned);
    assert_eq!(view.return_date(), Some(today));
    assert_eq!(view.book_title, "Dune");

    delete_loan(
        &deps,
        DeleteLoan {
            loan_id: loan.loan_id,
        },
    )
    .await
    .unwrap();
    assert_eq!(stock_of(&deps, dune).await, 1);
    assert_eq!(deps.loan_read_model.list(0, 10).await.unwrap().total, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_postgres_concurrent_create_loan_respects_row_lock() {
    let pool = common::create_test_pool().await;
    let deps = setup(&pool).await;
    let borrower_id = insert_borrower(&pool, "Alice").await;
    let dune = insert_book(&deps, "Dune", 3).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let deps = deps.clone();
        handles.push(tokio::spawn(async move {
            create_loan(
                &deps,
                CreateLoan {
                    book_id: dune,
                    borrower_id,
                    loaned_at: Utc::now(),
                },
            )
            .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(stock_of(&deps, dune).await, 0);
    assert_eq!(deps.loan_read_model.list(0, 10).await.unwrap().total, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_postgres_return_and_delete_wait_for_row_lock() {
    let pool = common::create_test_pool().await;
    let deps = setup(&pool).await;
    let alice = insert_borrower(&pool, "Alice").await;
    let bob = insert_borrower(&pool, "Bob").await;
    let carol = insert_borrower(&pool, "Carol").await;
    let total = 3;
    let dune = insert_book(&deps, "Dune", total).await;

    let mut loan_ids = Vec::new();
    for borrower_id in [alice, bob] {
        let loan = create_loan(
            &deps,
            CreateLoan {
                book_id: dune,
                borrower_id,
                loaned_at: Utc::now(),
            },
        )
        .await
        .unwrap()
        .value;
        loan_ids.push(loan.loan_id);
    }

    // Carolへの貸出トランザクションで蔵書行をロックしたままにする
    let mut tx = deps.loan_store.begin().await.unwrap();
    let book = tx.lock_book(dune).await.unwrap().unwrap();
    let (carol_loan, lent_book) = domain::loan::lend_book(&book, carol, Utc::now()).unwrap();

    let returning = {
        let deps = deps.clone();
        let loan_id = loan_ids[0];
        tokio::spawn(async move {
            mark_returned(
                &deps,
                MarkReturned {
                    loan_id,
                    returned_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                },
            )
            .await
        })
    };
    let deleting = {
        let deps = deps.clone();
        let loan_id = loan_ids[1];
        tokio::spawn(async move { delete_loan(&deps, DeleteLoan { loan_id }).await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!returning.is_finished());
    assert!(!deleting.is_finished());

    tx.insert_loan(&carol_loan).await.unwrap();
    tx.set_stock(dune, lent_book.stock).await.unwrap();
    tx.commit().await.unwrap();

    returning.await.unwrap().unwrap();
    deleting.await.unwrap().unwrap();

    let loans = deps.loan_read_model.list(0, 100).await.unwrap().loans;
    let active = loans.iter().filter(|loan| !loan.returned()).count() as u32;
    assert_eq!(active, 1);
    assert_eq!(stock_of(&deps, dune).await + active, total);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_postgres_borrower_directory() {
    let pool = common::create_test_pool().await;
    let deps = setup(&pool).await;
    let alice = insert_borrower(&pool, "Alice").await;

    assert!(deps.borrower_directory.exists(alice).await.unwrap());
    assert!(!deps.borrower_directory.exists(BorrowerId::new()).await.unwrap());
}
