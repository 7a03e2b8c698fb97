//! The `refreshToken` cookie.

use axum::http::{header, HeaderMap};
use cookie::{time::Duration, Cookie, SameSite};

pub const REFRESH_COOKIE: &str = "refreshToken";

fn same_site(secure: bool) -> SameSite {
    // Browsers drop SameSite=None cookies that are not Secure.
    if secure {
        SameSite::None
    } else {
        SameSite::Lax
    }
}

/// Cookie carrying a freshly issued refresh token.
pub fn refresh_cookie(token: String, max_age: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(same_site(secure))
        .path("/")
        .max_age(Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Expired cookie that makes the browser forget the refresh token.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(same_site(secure))
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}

/// Refresh token sent by the browser, if any.
pub fn read_refresh_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == REFRESH_COOKIE && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}
