//! Member model and related types
//!
//! A member wraps a user account; the account's username and email are
//! flattened into the member on read.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Member joined with its user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub email: Option<String>,
}

impl Member {
    /// Email to notify, if one is on file
    pub fn contact_email(&self) -> Option<&str> {
        non_empty(self.email.as_deref())
    }
}

/// Treats a blank email the same as a missing one
pub fn non_empty(email: Option<&str>) -> Option<&str> {
    email.map(str::trim).filter(|e| !e.is_empty())
}

/// Create member request (creates the user account too)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Update member request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Row of the top active members ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TopActiveMember {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub active_loans: i64,
}
