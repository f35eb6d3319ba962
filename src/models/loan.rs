//! Loan model and related types

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Length of a loan when no due date is given
pub const DEFAULT_LOAN_DAYS: i64 = 14;

pub const NO_AVAILABLE_COPIES: &str = "No available copies.";
pub const MEMBER_DOES_NOT_EXIST: &str = "Member does not exist.";
pub const ACTIVE_LOAN_DOES_NOT_EXIST: &str = "Active loan does not exist.";
pub const ALREADY_BORROWED: &str = "Member already has an active loan for this book.";
pub const OVERDUE_NOT_EXTENDABLE: &str = "You can not extend an overdue loan.";

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub due_date: NaiveDate,
    pub is_returned: bool,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    /// Not returned and due before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_returned && self.due_date < today
    }
}

/// Due date of a loan opened on `today`
pub fn default_due_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_LOAN_DAYS)
}

/// Direct loan record creation (no availability bookkeeping)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
    pub member_id: i32,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_returned: bool,
    pub return_date: Option<NaiveDate>,
}

/// Update loan request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateLoan {
    pub due_date: Option<NaiveDate>,
    pub is_returned: Option<bool>,
    pub return_date: Option<NaiveDate>,
}

/// Checkout / return request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MemberRef {
    pub member_id: Option<i32>,
}

/// Due-date extension request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExtendDueDate {
    #[validate(range(min = 1, max = 30, message = "additional_days must be between 1 and 30"))]
    pub additional_days: i32,
}

/// Overdue loan with the fields its reminder needs
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OverdueLoan {
    pub loan_id: i32,
    pub username: String,
    pub email: Option<String>,
    pub book_title: String,
}

/// Fields of the checkout confirmation email
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LoanNotice {
    pub loan_id: i32,
    pub username: String,
    pub email: Option<String>,
    pub book_title: String,
    pub due_date: NaiveDate,
}
