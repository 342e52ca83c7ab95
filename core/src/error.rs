//! Error types for the backend API client.
//!
//! # Design
//! `ApiError` keeps the failure kind for logging, but callers never branch on
//! it: `ApiClient` collapses every variant into `Envelope::Failure` using the
//! `Display` text as the human-readable message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status. `message` is the backend's
    /// own failure message when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("unexpected response from server: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("could not encode request: {0}")]
    Serialization(String),

    /// `success: true` arrived without a `data` field.
    #[error("server reported success but sent no data")]
    MissingData,
}

impl ApiError {
    /// Build a `Rejected` error, falling back to the status line when the
    /// server gave no usable message.
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));
        ApiError::Rejected { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_keeps_backend_message() {
        let err = ApiError::rejected(404, Some("not found".to_string()));
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn rejected_without_message_uses_status() {
        let err = ApiError::rejected(500, Some("   ".to_string()));
        assert_eq!(err.to_string(), "request failed with status 500");
    }
}
