//! Book (checked-out catalog entry) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::volume::Volume;
use crate::error::{AppError, AppResult};

/// Book row. `id` is the external catalog volume id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub issue_dt: Option<String>,
    pub img_url: String,
    pub ebook: Option<String>,
    pub audio_book: Option<String>,
    pub video_book: Option<String>,
    pub month: i64,
    pub user_id: Option<i64>,
    pub checked_out_at: DateTime<Utc>,
}

/// Fields extracted from a catalog volume at checkout time
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub img_url: String,
    pub ebook: String,
}

impl TryFrom<&Volume> for NewBook {
    type Error = AppError;

    fn try_from(volume: &Volume) -> AppResult<Self> {
        let info = &volume.volume_info;

        let title = non_empty(info.title.as_deref())
            .ok_or_else(|| AppError::Validation("Catalog entry has no title".to_string()))?;

        let authors: Vec<&str> = info
            .authors
            .iter()
            .flatten()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if authors.is_empty() {
            return Err(AppError::Validation("Catalog entry has no authors".to_string()));
        }

        let img_url = non_empty(
            info.image_links
                .as_ref()
                .and_then(|links| links.thumbnail.as_deref()),
        )
        .ok_or_else(|| AppError::Validation("Catalog entry has no cover image".to_string()))?;

        let ebook = non_empty(info.preview_link.as_deref())
            .ok_or_else(|| AppError::Validation("Catalog entry has no preview link".to_string()))?;

        Ok(NewBook {
            id: volume.id.clone(),
            title,
            author: authors.join(", "),
            img_url,
            ebook,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Result of a checkout request
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The book was not in the store and now belongs to the caller
    CheckedOut(Book),
    /// The book was already checked out, possibly by someone else
    AlreadyCheckedOut(Book),
}

impl CheckoutOutcome {
    pub fn book(&self) -> &Book {
        match self {
            CheckoutOutcome::CheckedOut(book) | CheckoutOutcome::AlreadyCheckedOut(book) => book,
        }
    }
}
