//! Stateless HTTP request builder and envelope parser for the backend API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and an optional bearer token. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a single `parse` method that turns any `HttpResponse` into an
//! `Envelope`. The caller executes the round trip in between.
//!
//! `parse` never returns an error. Every failure mode (non-2xx status, a
//! failure envelope, a body that does not decode) lands in
//! `Envelope::Failure` with a message a person can read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

/// The part of a failure body we care about.
#[derive(Deserialize)]
struct FailureBody {
    message: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// A copy of this client that sends `token` as a bearer credential.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            headers: self.auth_headers(),
            body: None,
        }
    }

    pub fn build_create<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.build_with_body(HttpMethod::Post, path, body)
    }

    pub fn build_update<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.build_with_body(HttpMethod::Patch, path, body)
    }

    /// Interpret a response as an envelope of `T`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Envelope<T> {
        match decode(response) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = ?err, "backend call failed");
                Envelope::from(err)
            }
        }
    }

    /// Normalize an error raised before a response existed (serialization,
    /// transport) into the failure branch.
    pub fn failure<T>(&self, err: ApiError) -> Envelope<T> {
        tracing::warn!(error = ?err, "backend call failed");
        Envelope::from(err)
    }

    fn build_with_body<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        headers.extend(self.auth_headers());
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers,
            body: Some(body),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        match &self.token {
            Some(token) => vec![("authorization".to_string(), format!("Bearer {token}"))],
            None => Vec::new(),
        }
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<Envelope<T>, ApiError> {
    if !response.is_success() {
        let message = serde_json::from_str::<FailureBody>(&response.body)
            .ok()
            .and_then(|body| body.message);
        return Err(ApiError::rejected(response.status, message));
    }
    Envelope::from_json(&response.body)
}
