//! Session glue between browsers and the backend.
//!
//! `ResponseCookies` lets `tutor_core::session::create_session` write
//! `Set-Cookie` headers onto an axum response. `Viewer` is the per-request
//! view of who is looking: the optional signed-in user and an `Api` that
//! carries their token.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{InvalidHeaderValue, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use tutor_core::session::{session_token, Cookie, CookieStore};
use tutor_core::User;

use crate::api::Api;
use crate::DashboardState;

/// Appends cookies to a response's headers. Fails when the cookie cannot be
/// encoded as a header value.
pub struct ResponseCookies<'a>(pub &'a mut HeaderMap);

impl CookieStore for ResponseCookies<'_> {
    type Error = InvalidHeaderValue;

    fn set(&mut self, cookie: Cookie<'static>) -> Result<(), Self::Error> {
        let value = HeaderValue::from_str(&cookie.to_string())?;
        self.0.append(SET_COOKIE, value);
        Ok(())
    }
}

pub struct Viewer {
    pub user: Option<User>,
    pub api: Api,
}

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Resolve the signed-in user from the `session` cookie. Any failure, from
/// a missing cookie to a rejected token, leaves the viewer anonymous.
pub async fn identify(api: &Api, headers: &HeaderMap) -> Viewer {
    let token = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_token);
    let Some(token) = token else {
        return Viewer {
            user: None,
            api: api.clone(),
        };
    };
    let api = api.with_token(&token);
    let user = api.get::<User>("auth/me").await.into_data();
    if user.is_none() {
        tracing::debug!("session cookie present but not accepted");
    }
    Viewer { user, api }
}

impl FromRequestParts<DashboardState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DashboardState,
    ) -> Result<Self, Self::Rejection> {
        Ok(identify(&state.api, &parts.headers).await)
    }
}
