//! Session cookie issuance.
//!
//! The session is an opaque bearer token stored in a cookie named `session`
//! that lives seven days from issuance. It is `HttpOnly`, `Secure`,
//! `SameSite=Lax` and scoped to `/` so whatever reads it downstream sees it on
//! every request.

use std::convert::Infallible;

pub use cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

pub const SESSION_COOKIE: &str = "session";

/// Seven days.
pub const SESSION_LIFETIME: Duration = Duration::days(7);

/// Somewhere a cookie can be persisted.
///
/// Errors are handed straight back to whoever issued the session; nothing in
/// this module recovers from a store that cannot accept a cookie.
pub trait CookieStore {
    type Error;

    fn set(&mut self, cookie: Cookie<'static>) -> Result<(), Self::Error>;
}

impl CookieStore for CookieJar {
    type Error = Infallible;

    fn set(&mut self, cookie: Cookie<'static>) -> Result<(), Self::Error> {
        self.add(cookie);
        Ok(())
    }
}

/// Build the session cookie for `token`, expiring `SESSION_LIFETIME` after
/// `issued_at`.
pub fn session_cookie(token: &str, issued_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_owned()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .expires(issued_at + SESSION_LIFETIME)
        .build()
}

/// Persist `token` as the session cookie, issued now.
pub fn create_session<S: CookieStore>(store: &mut S, token: &str) -> Result<(), S::Error> {
    create_session_at(store, token, OffsetDateTime::now_utc())
}

pub fn create_session_at<S: CookieStore>(
    store: &mut S,
    token: &str,
    issued_at: OffsetDateTime,
) -> Result<(), S::Error> {
    store.set(session_cookie(token, issued_at))?;
    tracing::debug!(expires = %(issued_at + SESSION_LIFETIME), "session cookie issued");
    Ok(())
}

/// Extract the session token from a request `Cookie` header, if any.
pub fn session_token(cookie_header: &str) -> Option<String> {
    Cookie::split_parse(cookie_header)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|token| !token.is_empty())
}
