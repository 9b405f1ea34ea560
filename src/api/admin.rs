//! Admin-only pages

use axum::{extract::State, response::Html};

use crate::{error::AppResult, AppState};

use super::{views, RequireAdmin};

/// All accounts with their role and number of books
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Html<String>> {
    let users = state.services.users.list_with_book_counts().await?;
    Ok(Html(views::admin_users(&admin, &users)))
}
