//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User, UserSummary},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a new user. `password_hash` must already be hashed.
    ///
    /// Admin when `grant_admin` is set, or when `first_user_is_admin` is set
    /// and the table is empty at insert time. The check runs in the INSERT.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        grant_admin: bool,
        first_user_is_admin: bool,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role, created_at)
            VALUES (
                ?, ?, ?,
                CASE WHEN ? OR (? AND NOT EXISTS (SELECT 1 FROM users)) THEN ? ELSE ? END,
                ?
            )
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(grant_admin)
        .bind(first_user_is_admin)
        .bind(Role::Admin)
        .bind(Role::Member)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::DuplicateEmail
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(user)
    }

    /// List all users with the number of books they hold
    pub async fn list_with_book_counts(&self) -> AppResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.role,
                   (SELECT COUNT(*) FROM books b WHERE b.user_id = u.id) AS nb_books
            FROM users u
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
