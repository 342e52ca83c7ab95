//! Dashboard error types.
//!
//! Backend failures never show up here: they arrive as `Envelope::Failure`
//! and are rendered in place. `DashboardError` covers what the dashboard
//! itself cannot recover from.

use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure of the HTTP round trip to the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("could not set session cookie: {0}")]
    Cookie(#[from] InvalidHeaderValue),

    #[error("could not bind listener: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}
