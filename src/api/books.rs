//! Book endpoints, including checkout and return

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::ApiJson;
use crate::{
    error::AppResult,
    models::{
        book::{CreateBook, UpdateBook},
        loan::MemberRef,
        Book, Loan, Page, PageParams,
    },
    AppState,
};

/// Outcome of a checkout or a return
#[derive(Serialize, ToSchema)]
pub struct LoanStatusResponse {
    pub status: String,
    pub loan: Loan,
}

/// A missing or unreadable body counts as no member
fn member_ref(body: Option<ApiJson<MemberRef>>) -> MemberRef {
    body.map(|ApiJson(request)| request).unwrap_or_default()
}

/// List books ordered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<i64>, Query, description = "Results per page (default: 10, max: 100)")
    ),
    responses(
        (status = 200, description = "Page of books", body = crate::models::pagination::BookPage),
        (status = 404, description = "Invalid page", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<Book>>> {
    let request = params.resolve()?;
    let (books, count) = state.services.catalog.list_books(&request).await?;
    Ok(Json(Page::build(books, count, &request, uri.path())?))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or unknown author"),
        (status = 409, description = "ISBN already in use")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(book): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or unknown author"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already in use")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(book): ApiJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.catalog.update_book(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has active loans")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lend a copy of the book to a member
#[utoipa::path(
    post,
    path = "/books/{id}/loan",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = MemberRef,
    responses(
        (status = 201, description = "Book loaned", body = LoanStatusResponse),
        (status = 400, description = "No copies left, unknown member or already borrowed", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Option<ApiJson<MemberRef>>,
) -> AppResult<(StatusCode, Json<LoanStatusResponse>)> {
    let loan = state.services.loans.checkout(id, member_ref(body)).await?;
    Ok((
        StatusCode::CREATED,
        Json(LoanStatusResponse {
            status: "Book loaned successfully.".to_string(),
            loan,
        }),
    ))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/books/{id}/return_book",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = MemberRef,
    responses(
        (status = 200, description = "Book returned", body = LoanStatusResponse),
        (status = 400, description = "No active loan for this member", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Option<ApiJson<MemberRef>>,
) -> AppResult<Json<LoanStatusResponse>> {
    let loan = state.services.loans.return_book(id, member_ref(body)).await?;
    Ok(Json(LoanStatusResponse {
        status: "Book returned successfully.".to_string(),
        loan,
    }))
}
