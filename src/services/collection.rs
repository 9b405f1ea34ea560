//! Collection store: checking catalog entries out into a user's collection

use crate::{
    error::AppResult,
    models::{
        book::{Book, CheckoutOutcome, NewBook},
        user::User,
        volume::Volume,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CollectionService {
    repository: Repository,
}

impl CollectionService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check `volume` out to `user`. Idempotent per catalog id: a second
    /// checkout returns the stored book and leaves its owner unchanged.
    pub async fn checkout(&self, user: &User, volume: &Volume) -> AppResult<CheckoutOutcome> {
        let new_book = NewBook::try_from(volume)?;
        let outcome = self.repository.books.checkout(&new_book, user.id).await?;

        match &outcome {
            CheckoutOutcome::CheckedOut(book) => {
                tracing::info!(user_id = user.id, book_id = %book.id, "Book checked out");
            }
            CheckoutOutcome::AlreadyCheckedOut(book) => {
                tracing::info!(
                    user_id = user.id,
                    book_id = %book.id,
                    owner_id = ?book.user_id,
                    "Book already checked out"
                );
            }
        }

        Ok(outcome)
    }

    /// Books held by `user_id`, newest first
    pub async fn books_for(&self, user_id: i64) -> AppResult<Vec<Book>> {
        self.repository.books.get_user_books(user_id).await
    }
}
