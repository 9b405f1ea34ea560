//! Home page and search form

use axum::{
    extract::Form,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use validator::Validate;

use crate::models::volume::SearchForm;

use super::{encode_segment, session, validation_messages, views, CurrentUser};

/// Search form for members, landing page for anonymous visitors
pub async fn index(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    let (jar, flash) = session::take_flash(jar);
    match user {
        Some(user) => (jar, Html(views::search_form(&user, flash.as_deref(), &[]))).into_response(),
        None => (jar, Html(views::landing(flash.as_deref()))).into_response(),
    }
}

/// Turn the submitted search box into a `/search/<title>` redirect.
/// Anonymous callers get the landing page whatever the body holds.
pub async fn submit_search(
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    form: Option<Form<SearchForm>>,
) -> Response {
    let Some(user) = user else {
        return index(CurrentUser(None), jar).await;
    };
    let Form(form) = form.unwrap_or_default();

    if let Err(errors) = form.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::search_form(&user, None, &validation_messages(&errors))),
        )
            .into_response();
    }

    let title = form.title.trim();
    if title.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::search_form(
                &user,
                None,
                &["Please enter a title to search for".to_string()],
            )),
        )
            .into_response();
    }

    Redirect::to(&format!("/search/{}", encode_segment(title))).into_response()
}
