//! Translation of domain errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use shared::ErrorResponse;

use crate::backend::domain::LedgerError;

/// An error response with a JSON `{ "message": ... }` body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            LedgerError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            LedgerError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            LedgerError::Storage(source) => {
                error!("Storage failure: {:#}", source);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_error_kind() {
        let cases = [
            (LedgerError::validation("bad"), StatusCode::BAD_REQUEST),
            (LedgerError::not_found("gone"), StatusCode::NOT_FOUND),
            (LedgerError::conflict("twice"), StatusCode::CONFLICT),
            (
                LedgerError::Storage(anyhow::anyhow!("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let api_error = ApiError::from(LedgerError::Storage(anyhow::anyhow!("secret path")));
        assert_eq!(api_error.message(), "Internal server error");
    }
}
