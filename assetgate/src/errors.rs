use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Login and password do not resolve to a user. Deliberately does not say which one was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Presented token is unknown, or a newer login superseded it
    #[error("No open session for token")]
    NoOpenSession,

    /// Asset lookup miss: either it does not exist or it belongs to someone else
    #[error("Asset not found or forbidden")]
    NotFoundOrForbidden,

    /// No response within `request_timeout`
    #[error("Request timed out")]
    RequestTimeout,

    /// Malformed request at the HTTP boundary
    #[error("{message}")]
    BadRequest { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Storage operation error
    #[error(transparent)]
    Database(#[from] DbError),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::NoOpenSession => StatusCode::UNAUTHORIZED,
            Error::NotFoundOrForbidden => StatusCode::FORBIDDEN,
            Error::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Internal { .. } | Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidCredentials => "invalid login/password".to_string(),
            Error::NoOpenSession => "session not open or has expired".to_string(),
            Error::NotFoundOrForbidden => "you can't get this asset".to_string(),
            Error::RequestTimeout => "request timed out".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Internal { .. } | Error::Database(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Internal { .. } | Error::Database(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::InvalidCredentials | Error::NoOpenSession | Error::NotFoundOrForbidden => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::RequestTimeout => {
                tracing::warn!("Request exceeded its deadline");
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = json!({ "error": self.user_message() });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NoOpenSession.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFoundOrForbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            Error::BadRequest {
                message: "bad".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::RequestTimeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = Error::Database(DbError::Other(anyhow::anyhow!("relation \"sessions\" does not exist")));
        assert_eq!(err.user_message(), "internal server error");

        let err = Error::Internal {
            operation: "hash password: engine exploded".to_string(),
        };
        assert_eq!(err.user_message(), "internal server error");
    }

    #[test]
    fn test_auth_failures_are_distinct() {
        assert_ne!(Error::InvalidCredentials.user_message(), Error::NoOpenSession.user_message());
    }
}
