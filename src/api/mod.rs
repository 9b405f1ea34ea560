//! HTTP handlers, extractors and router

pub mod admin;
pub mod auth;
pub mod books;
pub mod health;
pub mod home;
pub mod session;
pub mod views;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use validator::ValidationErrors;

use crate::{error::AppError, models::user::User, AppState};

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a value for use as a single URL path segment
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Flatten validator errors into user-facing messages
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .collect();
    messages.sort();
    messages
}

/// The caller's identity: a user, or `None` for anonymous requests
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(session::SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Ok(CurrentUser(None));
        };

        let user = state.services.users.resolve_session(&token).await?;
        Ok(CurrentUser(user))
    }
}

/// Extractor for routes that need a logged-in user
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) => Ok(RequireUser(user)),
            CurrentUser(None) => Err(AppError::Unauthenticated),
        }
    }
}

/// Extractor for admin-only routes. Anonymous and non-admin callers get a 403.
pub struct RequireAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) if user.is_admin() => Ok(RequireAdmin(user)),
            CurrentUser(Some(user)) => {
                tracing::warn!(user_id = user.id, "Non-admin user denied access to admin route");
                Err(AppError::Forbidden("Administrator privileges required".to_string()))
            }
            CurrentUser(None) => {
                Err(AppError::Forbidden("Administrator privileges required".to_string()))
            }
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index).post(home::submit_search))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/search/:title", get(books::search).post(books::search))
        .route("/checkout/:volume_id", get(books::checkout).post(books::checkout))
        .route("/collection", get(books::collection))
        .route("/admin/users", get(admin::list_users))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
}
