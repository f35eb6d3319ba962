//! Loan lifecycle service: checkout, return and due-date extension

use std::sync::Arc;

use validator::Validate;

use super::today;
use crate::{
    error::{AppError, AppResult},
    jobs::{Job, JobQueue},
    models::{
        loan::{
            default_due_date, CreateLoan, ExtendDueDate, MemberRef, UpdateLoan,
            ACTIVE_LOAN_DOES_NOT_EXIST, ALREADY_BORROWED, MEMBER_DOES_NOT_EXIST,
            NO_AVAILABLE_COPIES, OVERDUE_NOT_EXTENDABLE,
        },
        Loan, Member, PageRequest,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    queue: Arc<dyn JobQueue>,
}

impl LoansService {
    pub fn new(repository: Repository, queue: Arc<dyn JobQueue>) -> Self {
        Self { repository, queue }
    }

    pub async fn list(&self, page: &PageRequest) -> AppResult<(Vec<Loan>, i64)> {
        self.repository.loans.list(page.limit(), page.offset()).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.get_by_id(id).await
    }

    /// Record a loan row directly. Availability is left untouched.
    pub async fn create(&self, data: CreateLoan) -> AppResult<Loan> {
        self.repository
            .books
            .get_by_id(data.book_id)
            .await
            .map_err(|e| not_found_as_bad_request(e, "Book does not exist."))?;
        self.find_member(Some(data.member_id)).await?;

        let due_date = data.due_date.unwrap_or_else(|| default_due_date(today()));
        self.repository.loans.create(&data, due_date).await
    }

    pub async fn update(&self, id: i32, data: UpdateLoan) -> AppResult<Loan> {
        self.repository.loans.update(id, &data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.loans.delete(id).await
    }

    /// Lend one copy of `book_id` to the member in `request`
    pub async fn checkout(&self, book_id: i32, request: MemberRef) -> AppResult<Loan> {
        let book = self.repository.books.get_by_id(book_id).await?;
        if !book.is_available() {
            return Err(AppError::BadRequest(NO_AVAILABLE_COPIES.to_string()));
        }

        let member = self.find_member(request.member_id).await?;

        if self
            .repository
            .loans
            .find_active(book.id, member.id)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(ALREADY_BORROWED.to_string()));
        }

        let loan = self
            .repository
            .loans
            .checkout(book.id, member.id, default_due_date(today()))
            .await?;

        tracing::info!(
            "Loan {} opened: book {} to member {}, due {}",
            loan.id,
            book.id,
            member.id,
            loan.due_date
        );

        // The loan is committed at this point; a queue outage only costs the email
        if let Err(e) = self
            .queue
            .enqueue(Job::SendLoanNotification { loan_id: loan.id })
            .await
        {
            tracing::error!("Failed to enqueue confirmation for loan {}: {}", loan.id, e);
        }

        Ok(loan)
    }

    /// Close the member's active loan of `book_id`
    pub async fn return_book(&self, book_id: i32, request: MemberRef) -> AppResult<Loan> {
        let book = self.repository.books.get_by_id(book_id).await?;

        let active = match request.member_id {
            Some(member_id) => self.repository.loans.find_active(book.id, member_id).await?,
            None => None,
        };
        let loan = active.ok_or_else(|| AppError::BadRequest(ACTIVE_LOAN_DOES_NOT_EXIST.to_string()))?;

        let returned = self.repository.loans.return_loan(loan.id, today()).await?;
        tracing::info!("Loan {} returned: book {}", returned.id, book.id);
        Ok(returned)
    }

    /// Push the due date of an active, not yet overdue loan
    pub async fn extend_due_date(&self, loan_id: i32, request: ExtendDueDate) -> AppResult<Loan> {
        request.validate()?;

        let loan = self.repository.loans.get_by_id(loan_id).await?;
        let today = today();

        if loan.is_returned {
            return Err(AppError::BadRequest(ACTIVE_LOAN_DOES_NOT_EXIST.to_string()));
        }
        if loan.is_overdue(today) {
            return Err(AppError::BadRequest(OVERDUE_NOT_EXTENDABLE.to_string()));
        }

        let extended = self
            .repository
            .loans
            .extend_due_date(loan.id, request.additional_days, today)
            .await?
            .ok_or_else(|| AppError::BadRequest(ACTIVE_LOAN_DOES_NOT_EXIST.to_string()))?;

        tracing::info!(
            "Loan {} extended by {} day(s): due {}",
            extended.id,
            request.additional_days,
            extended.due_date
        );
        Ok(extended)
    }

    async fn find_member(&self, member_id: Option<i32>) -> AppResult<Member> {
        let member = match member_id {
            Some(id) => self.repository.members.find_by_id(id).await?,
            None => None,
        };
        member.ok_or_else(|| AppError::BadRequest(MEMBER_DOES_NOT_EXIST.to_string()))
    }
}

fn not_found_as_bad_request(e: AppError, message: &str) -> AppError {
    match e {
        AppError::NotFound(_) => AppError::BadRequest(message.to_string()),
        other => other,
    }
}
