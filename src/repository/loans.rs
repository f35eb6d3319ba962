//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use super::LoanStore;
use crate::{
    error::{map_write_error, AppError, AppResult},
    models::loan::{
        CreateLoan, Loan, LoanNotice, OverdueLoan, UpdateLoan, ACTIVE_LOAN_DOES_NOT_EXIST,
        NO_AVAILABLE_COPIES,
    },
};

const DUPLICATE_LOAN: &str = "Loan already exists";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Loan>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
            .fetch_one(&self.pool)
            .await?;

        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((loans, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn create(&self, data: &CreateLoan, due_date: NaiveDate) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, due_date, is_returned, return_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.book_id)
        .bind(data.member_id)
        .bind(due_date)
        .bind(data.is_returned)
        .bind(data.return_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_LOAN))
    }

    async fn update(&self, id: i32, data: &UpdateLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET due_date = COALESCE($1, due_date),
                is_returned = COALESCE($2, is_returned),
                return_date = COALESCE($3, return_date)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.due_date)
        .bind(data.is_returned)
        .bind(data.return_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loan with id {} not found", id)));
        }
        Ok(())
    }

    async fn find_active(&self, book_id: i32, member_id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE book_id = $1 AND member_id = $2 AND is_returned = FALSE
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn count_active_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND is_returned = FALSE",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_active_for_member(&self, member_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND is_returned = FALSE",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn checkout(&self, book_id: i32, member_id: i32, due_date: NaiveDate) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        // Never takes the count below zero, even under concurrent checkouts
        let taken = sqlx::query(
            r#"
            UPDATE books SET available_copies = available_copies - 1
            WHERE id = $1 AND available_copies > 0
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            return Err(AppError::BadRequest(NO_AVAILABLE_COPIES.to_string()));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, due_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_LOAN))?;

        tx.commit().await?;
        Ok(loan)
    }

    async fn return_loan(&self, loan_id: i32, return_date: NaiveDate) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET is_returned = TRUE, return_date = $2
            WHERE id = $1 AND is_returned = FALSE
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(return_date)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BadRequest(ACTIVE_LOAN_DOES_NOT_EXIST.to_string()))?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    async fn extend_due_date(&self, loan_id: i32, days: i32, today: NaiveDate) -> AppResult<Option<Loan>> {
        // Same conditions as the service check, re-applied atomically
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET due_date = due_date + $2::int
            WHERE id = $1 AND is_returned = FALSE AND due_date >= $3
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(days)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn find_overdue(&self, today: NaiveDate) -> AppResult<Vec<OverdueLoan>> {
        let loans = sqlx::query_as::<_, OverdueLoan>(
            r#"
            SELECT l.id AS loan_id, u.username, u.email, b.title AS book_title
            FROM loans l
            JOIN members m ON m.id = l.member_id
            JOIN users u ON u.id = m.user_id
            JOIN books b ON b.id = l.book_id
            WHERE l.is_returned = FALSE AND l.due_date < $1
            ORDER BY l.due_date, l.id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    async fn notice(&self, loan_id: i32) -> AppResult<Option<LoanNotice>> {
        let notice = sqlx::query_as::<_, LoanNotice>(
            r#"
            SELECT l.id AS loan_id, u.username, u.email, b.title AS book_title, l.due_date
            FROM loans l
            JOIN members m ON m.id = l.member_id
            JOIN users u ON u.id = m.user_id
            JOIN books b ON b.id = l.book_id
            WHERE l.id = $1
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notice)
    }
}
