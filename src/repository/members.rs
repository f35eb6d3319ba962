//! Members repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::MemberStore;
use crate::{
    error::{map_write_error, AppError, AppResult},
    models::member::{CreateMember, Member, TopActiveMember, UpdateMember},
};

const DUPLICATE_USERNAME: &str = "Username already exists";

const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.user_id, u.username, u.email
    FROM members m
    JOIN users u ON u.id = m.user_id
"#;

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for MembersRepository {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<Member>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        let members = sqlx::query_as::<_, Member>(&format!(
            "{} ORDER BY m.id LIMIT $1 OFFSET $2",
            MEMBER_SELECT
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((members, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!("{} WHERE m.id = $1", MEMBER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn create(&self, data: &CreateMember) -> AppResult<Member> {
        let mut tx = self.pool.begin().await?;

        let user_id: i32 = sqlx::query_scalar(
            "INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id",
        )
        .bind(&data.username)
        .bind(&data.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_USERNAME))?;

        let member_id: i32 =
            sqlx::query_scalar("INSERT INTO members (user_id) VALUES ($1) RETURNING id")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(Member {
            id: member_id,
            user_id,
            username: data.username.clone(),
            email: data.email.clone(),
        })
    }

    async fn update(&self, id: i32, data: &UpdateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE users u
            SET username = COALESCE($1, u.username),
                email = COALESCE($2, u.email)
            FROM members m
            WHERE m.user_id = u.id AND m.id = $3
            RETURNING m.id, m.user_id, u.username, u.email
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_USERNAME))?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        // The member row goes with its user account
        let result = sqlx::query(
            "DELETE FROM users u USING members m WHERE m.user_id = u.id AND m.id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }
        Ok(())
    }

    async fn top_active(&self, limit: i64) -> AppResult<Vec<TopActiveMember>> {
        let members = sqlx::query_as::<_, TopActiveMember>(
            r#"
            SELECT m.id, u.username, u.email, COUNT(l.id) AS active_loans
            FROM members m
            JOIN users u ON u.id = m.user_id
            JOIN loans l ON l.member_id = m.id AND l.is_returned = FALSE
            GROUP BY m.id, u.username, u.email
            ORDER BY active_loans DESC, u.username ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
