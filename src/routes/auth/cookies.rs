use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration as TimeDuration;

use crate::services::tokens::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

fn session_cookie(name: &'static str, value: String, max_age: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(TimeDuration::seconds(max_age))
        .build()
}

fn append(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.append(SET_COOKIE, value);
    }
}

/// Both session cookies, as set on every successful signup/login.
pub fn session_cookies(access_token: String, refresh_token: String, secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        &session_cookie(ACCESS_COOKIE, access_token, ACCESS_TOKEN_TTL_SECS, secure),
    );
    append(
        &mut headers,
        &session_cookie(REFRESH_COOKIE, refresh_token, REFRESH_TOKEN_TTL_SECS, secure),
    );
    headers
}

/// Just the access cookie; refresh leaves the refresh token untouched.
pub fn access_cookie_headers(access_token: String, secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        &session_cookie(ACCESS_COOKIE, access_token, ACCESS_TOKEN_TTL_SECS, secure),
    );
    headers
}

/// Expires both cookies immediately.
pub fn clear_session_cookies(secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        &session_cookie(ACCESS_COOKIE, String::new(), 0, secure),
    );
    append(
        &mut headers,
        &session_cookie(REFRESH_COOKIE, String::new(), 0, secure),
    );
    headers
}
