//! Session and flash-message cookies

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Cookie carrying the signed session token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Drop the session cookie from the client
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// One-shot message displayed by the next rendered page
pub fn flash_cookie(message: &str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, utf8_percent_encode(message, NON_ALPHANUMERIC).to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Read and clear the pending flash message, if any
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).and_then(|cookie| {
        percent_decode_str(cookie.value())
            .decode_utf8()
            .ok()
            .map(|m| m.into_owned())
    });

    match message {
        Some(message) => (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message)),
        None => (jar, None),
    }
}
