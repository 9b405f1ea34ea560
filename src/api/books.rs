//! Catalog search, checkout and the user's collection

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{error::AppResult, AppState};

use super::{session, views, RequireUser};

/// Query the catalog and show up to five colored results
pub async fn search(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(title): Path<String>,
) -> AppResult<Html<String>> {
    let entries = state.services.catalog.search(&title).await?;
    Ok(Html(views::search_results(
        &user,
        &views::title_case(title.trim()),
        &entries,
    )))
}

/// Check a catalog entry out into the caller's collection
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(volume_id): Path<String>,
) -> AppResult<Html<String>> {
    let volume = state.services.catalog.volume(&volume_id).await?;
    let outcome = state.services.collection.checkout(&user, &volume).await?;
    Ok(Html(views::checkout_confirmation(&user, &outcome)))
}

pub async fn collection(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let books = state.services.collection.books_for(user.id).await?;
    let (jar, flash) = session::take_flash(jar);
    Ok((jar, Html(views::collection(&user, flash.as_deref(), &books))).into_response())
}
