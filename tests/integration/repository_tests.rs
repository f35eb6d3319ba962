//! Repository tests against a real Postgres database
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test repository_tests -- --ignored

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;

use library_server::{
    models::{
        author::CreateAuthor,
        book::CreateBook,
        loan::{CreateLoan, NO_AVAILABLE_COPIES},
        member::CreateMember,
    },
    repository::Repository,
    AppError,
};

async fn repository() -> Repository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Repository::new(pool)
}

fn unique() -> String {
    format!("{:013}", Utc::now().timestamp_micros().rem_euclid(10_000_000_000_000))
}

/// A fresh book with `copies` copies and a fresh member with an email
async fn fixtures(repository: &Repository, copies: i32) -> (i32, i32) {
    let suffix = unique();
    let author = repository
        .authors
        .create(&CreateAuthor {
            first_name: "Dan".to_string(),
            last_name: "Brown".to_string(),
        })
        .await
        .unwrap();
    let book = repository
        .books
        .create(&CreateBook {
            title: format!("Inferno {}", suffix),
            author_id: author.id,
            isbn: suffix.clone(),
            genre: "fiction".to_string(),
            available_copies: Some(copies),
        })
        .await
        .unwrap();
    let member = repository
        .members
        .create(&CreateMember {
            username: format!("reader{}", suffix),
            email: Some("test@mail.com".to_string()),
        })
        .await
        .unwrap();
    (book.id, member.id)
}

#[tokio::test]
#[ignore]
async fn test_checkout_decrements_and_refuses_at_zero() {
    let repository = repository().await;
    let (book_id, member_id) = fixtures(&repository, 1).await;
    let due = Utc::now().date_naive() + Duration::days(14);

    let loan = repository.loans.checkout(book_id, member_id, due).await.unwrap();
    assert!(!loan.is_returned);
    assert_eq!(repository.books.get_by_id(book_id).await.unwrap().available_copies, 0);

    let second = repository.loans.checkout(book_id, member_id, due).await;
    match second {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, NO_AVAILABLE_COPIES),
        other => panic!("unexpected result: {:?}", other.map(|l| l.id)),
    }
    assert_eq!(repository.loans.count_active_for_book(book_id).await.unwrap(), 1);

    repository.loans.return_loan(loan.id, Utc::now().date_naive()).await.unwrap();
    assert_eq!(repository.books.get_by_id(book_id).await.unwrap().available_copies, 1);
}

#[tokio::test]
#[ignore]
async fn test_extension_adds_exact_days() {
    let repository = repository().await;
    let (book_id, member_id) = fixtures(&repository, 1).await;
    let today = Utc::now().date_naive();
    let due = today + Duration::days(5);

    let loan = repository.loans.checkout(book_id, member_id, due).await.unwrap();
    let extended = repository
        .loans
        .extend_due_date(loan.id, 7, today)
        .await
        .unwrap()
        .expect("active loan should be extended");

    assert_eq!(extended.due_date, due + Duration::days(7));
}

#[tokio::test]
#[ignore]
async fn test_extension_skips_overdue_loan() {
    let repository = repository().await;
    let (book_id, member_id) = fixtures(&repository, 1).await;
    let today = Utc::now().date_naive();
    let due = today - Duration::days(1);

    let loan = repository.loans.checkout(book_id, member_id, due).await.unwrap();
    let extended = repository.loans.extend_due_date(loan.id, 7, today).await.unwrap();

    assert!(extended.is_none());
    assert_eq!(repository.loans.get_by_id(loan.id).await.unwrap().due_date, due);
}

#[tokio::test]
#[ignore]
async fn test_sweep_query_excludes_returned_loans() {
    let repository = repository().await;
    let (book_id, member_id) = fixtures(&repository, 2).await;
    let today = Utc::now().date_naive();
    let past = today - Duration::days(10);

    let overdue = repository
        .loans
        .create(
            &CreateLoan {
                book_id,
                member_id,
                due_date: Some(past),
                is_returned: false,
                return_date: None,
            },
            past,
        )
        .await
        .unwrap();
    let returned = repository
        .loans
        .create(
            &CreateLoan {
                book_id,
                member_id,
                due_date: Some(past),
                is_returned: true,
                return_date: Some(past),
            },
            past,
        )
        .await
        .unwrap();

    let found: Vec<i32> = repository
        .loans
        .find_overdue(today)
        .await
        .unwrap()
        .into_iter()
        .map(|loan| loan.loan_id)
        .collect();

    assert!(found.contains(&overdue.id));
    assert!(!found.contains(&returned.id));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_conflict() {
    let repository = repository().await;
    let (book_id, _) = fixtures(&repository, 1).await;
    let book = repository.books.get_by_id(book_id).await.unwrap();

    let result = repository
        .books
        .create(&CreateBook {
            title: "Copy".to_string(),
            author_id: book.author_id,
            isbn: book.isbn.clone(),
            genre: "fiction".to_string(),
            available_copies: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}
