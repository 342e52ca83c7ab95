//! Backend errors and their mapping onto failure envelopes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::dto::ApiResponse;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("invalid request body: {0}")]
    BadBody(String),
}

impl BackendError {
    pub fn status(&self) -> StatusCode {
        match self {
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::Validation(_) | BackendError::BadBody(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BackendError::Conflict(_) => StatusCode::CONFLICT,
            BackendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        BackendError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, error = %self, "request rejected");
        (status, Json(ApiResponse::<()>::fail(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_resource() {
        let err = BackendError::NotFound("Group");
        assert_eq!(err.to_string(), "Group not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_is_unprocessable() {
        let err = BackendError::Validation("Maximum age must be 18".into());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
