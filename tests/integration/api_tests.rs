//! API integration tests against a running server

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Suffix that keeps usernames and ISBNs unique across runs
fn unique() -> String {
    format!("{:013}", chrono::Utc::now().timestamp_micros().rem_euclid(10_000_000_000_000))
}

async fn post(client: &Client, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get(client: &Client, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Create an author, a book with `copies` copies and a member; returns (book_id, member_id)
async fn setup(client: &Client, copies: i32) -> (i64, i64) {
    let suffix = unique();

    let (status, author) = post(
        client,
        "/authors",
        json!({ "first_name": "Dan", "last_name": "Brown" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = post(
        client,
        "/books",
        json!({
            "title": "Inferno",
            "author_id": author["id"],
            "isbn": suffix,
            "genre": "fiction",
            "available_copies": copies
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, member) = post(
        client,
        "/members",
        json!({ "username": format!("reader{}", suffix), "email": "test@mail.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (book["id"].as_i64().unwrap(), member["id"].as_i64().unwrap())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let (status, body) = get(&client, "/health").await;

    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_list_books_is_paginated() {
    let client = Client::new();

    let (status, body) = get(&client, "/books?page_size=2").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["count"].is_i64());
    assert!(body["results"].as_array().unwrap().len() <= 2);
}

#[tokio::test]
#[ignore]
async fn test_invalid_page() {
    let client = Client::new();

    let (status, body) = get(&client, "/books?page=100000").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid page.");
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let (book_id, member_id) = setup(&client, 1).await;

    let (status, body) = post(
        &client,
        &format!("/books/{}/loan", book_id),
        json!({ "member_id": member_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Book loaned successfully.");
    let loan_id = body["loan"]["id"].as_i64().unwrap();

    // The only copy is out
    let (status, body) = post(
        &client,
        &format!("/books/{}/loan", book_id),
        json!({ "member_id": member_id }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No available copies.");

    let (_, before) = get(&client, &format!("/loans/{}", loan_id)).await;
    let (status, extended) = post(
        &client,
        &format!("/loans/{}/extend_due_date", loan_id),
        json!({ "additional_days": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(extended["due_date"], before["due_date"]);

    let (status, body) = post(
        &client,
        &format!("/books/{}/return_book", book_id),
        json!({ "member_id": member_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Book returned successfully.");
    assert_eq!(body["loan"]["is_returned"], true);

    let (status, body) = post(
        &client,
        &format!("/loans/{}/extend_due_date", loan_id),
        json!({ "additional_days": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Active loan does not exist.");

    let (_, book) = get(&client, &format!("/books/{}", book_id)).await;
    assert_eq!(book["available_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_checkout_unknown_member() {
    let client = Client::new();
    let (book_id, _) = setup(&client, 1).await;

    let (status, body) = post(
        &client,
        &format!("/books/{}/loan", book_id),
        json!({ "member_id": i32::MAX }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Member does not exist.");
}

#[tokio::test]
#[ignore]
async fn test_top_active_members() {
    let client = Client::new();

    let (status, body) = get(&client, "/members/top-active").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().len() <= 5);
}
