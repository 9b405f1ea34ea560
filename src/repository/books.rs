//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CheckoutOutcome, NewBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Books held by a user, most recent checkout first
    pub async fn get_user_books(&self, user_id: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE user_id = ? ORDER BY checked_out_at DESC, title",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Insert the book for `user_id` unless a book with the same catalog id
    /// already exists. The existing row is never modified.
    pub async fn checkout(&self, book: &NewBook, user_id: i64) -> AppResult<CheckoutOutcome> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO books (id, title, author, issue_dt, img_url, ebook, month, user_id, checked_out_at)
            VALUES (?, ?, ?, NULL, ?, ?, 0, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.img_url)
        .bind(&book.ebook)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Another edition titled \"{}\" is already checked out",
                    book.title
                ))
            } else {
                AppError::Database(e)
            }
        })?
        .rows_affected();

        let stored = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(&book.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if inserted == 1 {
            Ok(CheckoutOutcome::CheckedOut(stored))
        } else {
            Ok(CheckoutOutcome::AlreadyCheckedOut(stored))
        }
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
