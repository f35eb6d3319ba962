//! Repository layer for database operations
//!
//! Each aggregate has a store trait so services can be exercised against
//! mocks; the Postgres implementations live in the submodules.

pub mod authors;
pub mod books;
pub mod loans;
pub mod members;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        author::{CreateAuthor, UpdateAuthor},
        book::{CreateBook, UpdateBook},
        loan::{CreateLoan, UpdateLoan},
        member::{CreateMember, UpdateMember},
        Author, Book, Loan, LoanNotice, Member, OverdueLoan, TopActiveMember,
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    /// One page of authors ordered by id, with the total count
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Author>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Author>;
    async fn create(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// One page of books ordered by title, with the total count
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;
    async fn create(&self, data: &CreateBook) -> AppResult<Book>;
    async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Member>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Member>;
    /// `None` when no member has this id
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Member>>;
    async fn create(&self, data: &CreateMember) -> AppResult<Member>;
    async fn update(&self, id: i32, data: &UpdateMember) -> AppResult<Member>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    /// Members with active loans, most active first
    async fn top_active(&self, limit: i64) -> AppResult<Vec<TopActiveMember>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Loan>, i64)>;
    async fn get_by_id(&self, id: i32) -> AppResult<Loan>;
    async fn create(&self, data: &CreateLoan, due_date: NaiveDate) -> AppResult<Loan>;
    async fn update(&self, id: i32, data: &UpdateLoan) -> AppResult<Loan>;
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// The active loan of `book_id` held by `member_id`, if any
    async fn find_active(&self, book_id: i32, member_id: i32) -> AppResult<Option<Loan>>;
    async fn count_active_for_book(&self, book_id: i32) -> AppResult<i64>;
    async fn count_active_for_member(&self, member_id: i32) -> AppResult<i64>;

    /// Take one copy off the shelf and open a loan, atomically
    async fn checkout(&self, book_id: i32, member_id: i32, due_date: NaiveDate) -> AppResult<Loan>;
    /// Close an active loan and put the copy back, atomically
    async fn return_loan(&self, loan_id: i32, return_date: NaiveDate) -> AppResult<Loan>;
    /// Push the due date of an active, not yet overdue loan.
    /// `None` when the loan no longer qualifies.
    async fn extend_due_date(&self, loan_id: i32, days: i32, today: NaiveDate) -> AppResult<Option<Loan>>;

    /// Unreturned loans due before `today`, joined with member and book
    async fn find_overdue(&self, today: NaiveDate) -> AppResult<Vec<OverdueLoan>>;
    /// Fields for the checkout confirmation, `None` when the loan is gone
    async fn notice(&self, loan_id: i32) -> AppResult<Option<LoanNotice>>;
}

/// Main repository struct holding one store per aggregate
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
    pub members: Arc<dyn MemberStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            members: Arc::new(members::MembersRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool)),
        }
    }

    /// Assemble a repository from explicit stores
    pub fn from_stores(
        authors: Arc<dyn AuthorStore>,
        books: Arc<dyn BookStore>,
        members: Arc<dyn MemberStore>,
        loans: Arc<dyn LoanStore>,
    ) -> Self {
        Self {
            authors,
            books,
            members,
            loans,
        }
    }
}
