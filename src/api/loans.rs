//! Loan endpoints

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::ApiJson;
use crate::{
    error::AppResult,
    models::{
        loan::{CreateLoan, ExtendDueDate, UpdateLoan},
        Loan, Page, PageParams,
    },
    AppState,
};

/// List loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<i64>, Query, description = "Results per page (default: 10, max: 100)")
    ),
    responses(
        (status = 200, description = "Page of loans", body = crate::models::pagination::LoanPage),
        (status = 404, description = "Invalid page", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<Loan>>> {
    let request = params.resolve()?;
    let (loans, count) = state.services.loans.list(&request).await?;
    Ok(Json(Page::build(loans, count, &request, uri.path())?))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get(id).await?;
    Ok(Json(loan))
}

/// Record a loan directly, without touching availability
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan recorded", body = Loan),
        (status = 400, description = "Unknown book or member")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    ApiJson(loan): ApiJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let created = state.services.loans.create(loan).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a loan record
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn update_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(loan): ApiJson<UpdateLoan>,
) -> AppResult<Json<Loan>> {
    let updated = state.services.loans.update(id, loan).await?;
    Ok(Json(updated))
}

/// Delete a loan record
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.loans.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Push the due date of an active loan
#[utoipa::path(
    post,
    path = "/loans/{id}/extend_due_date",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = ExtendDueDate,
    responses(
        (status = 200, description = "Loan with its new due date", body = Loan),
        (status = 400, description = "Returned or overdue loan, or days out of range", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn extend_due_date(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(request): ApiJson<ExtendDueDate>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.extend_due_date(id, request).await?;
    Ok(Json(loan))
}
