//! Registration, login and logout

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, RegisterForm},
    AppState,
};

use super::{session, validation_messages, views, CurrentUser};

pub async fn register_page(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    let (jar, flash) = session::take_flash(jar);
    (jar, Html(views::register_form(flash.as_deref(), &[], "", ""))).into_response()
}

/// Create an account and log it in
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if let Err(errors) = form.validate() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::register_form(
                None,
                &validation_messages(&errors),
                &form.email,
                &form.name,
            )),
        )
            .into_response());
    }

    let user = state
        .services
        .users
        .register(&form.email, &form.name, &form.password)
        .await?;
    let token = state.services.users.create_session(&user)?;

    Ok((jar.add(session::session_cookie(token)), Redirect::to("/")).into_response())
}

pub async fn login_page(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    let (jar, flash) = session::take_flash(jar);
    (jar, Html(views::login_form(flash.as_deref()))).into_response()
}

/// Check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if form.validate().is_err() {
        tracing::info!("Login failed: incomplete form");
        return Err(AppError::InvalidCredentials);
    }

    let user = state
        .services
        .users
        .authenticate(&form.email, &form.password)
        .await?;
    let token = state.services.users.create_session(&user)?;

    Ok((jar.add(session::session_cookie(token)), Redirect::to("/")).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::clear_session(jar), Redirect::to("/"))
}
