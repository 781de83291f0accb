//! API errors with their HTTP status mapping.

use api_shared::ErrorRes;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dority_core::{ActionError, SessionError};

/// A failed request, ready to render as `{error, details?}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorRes,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorRes::new(message),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorRes::new(message),
        }
    }

    /// A 500 with a fixed headline; the underlying message goes to `details` unless hidden.
    pub fn internal(headline: &str, err: &dyn std::fmt::Display, hide_details: bool) -> Self {
        tracing::error!(error = %err, "{headline}");
        let body = ErrorRes::new(headline);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: if hide_details {
                body
            } else {
                body.with_details(err.to_string())
            },
        }
    }

    pub fn from_session(err: SessionError, headline: &str, hide_details: bool) -> Self {
        match err {
            SessionError::InvalidInput(message) => Self::bad_request(message),
            SessionError::NotFound(id) => Self::not_found(format!("Patient not found: {id}")),
            SessionError::Store(err) => Self::from_action(err, hide_details),
            other @ SessionError::Source(_) => Self::internal(headline, &other, hide_details),
        }
    }

    pub fn from_action(err: ActionError, hide_details: bool) -> Self {
        match err {
            ActionError::InvalidInput(_) => Self::bad_request(err.to_string()),
            ActionError::SessionNotFound(_) | ActionError::ActionNotFound(_) => {
                Self::not_found(err.to_string())
            }
            ActionError::AlreadyDecided { .. } => Self {
                status: StatusCode::CONFLICT,
                body: ErrorRes::new(err.to_string()),
            },
            ActionError::DuplicateSession(_) | ActionError::LockPoisoned => {
                Self::internal("Failed to access session state", &err, hide_details)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
