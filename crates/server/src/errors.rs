use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::customer::CustomerError;
use thiserror::Error;
use tracing::{debug, error};

/// Error returned by every handler; rendered as `{"error": ..., "code": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: u16,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), code: 1001 }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into(), code: 1004 }
    }
}

impl From<CustomerError> for ApiError {
    fn from(e: CustomerError) -> Self {
        let status = match &e {
            CustomerError::Validation(_)
            | CustomerError::DuplicatePhone
            | CustomerError::UnverifiedPhone => StatusCode::BAD_REQUEST,
            CustomerError::Unauthorized => StatusCode::UNAUTHORIZED,
            CustomerError::HashError(_)
            | CustomerError::TokenError(_)
            | CustomerError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status.is_server_error() {
            error!(error = %e, code = e.code(), "request failed");
            "internal server error".to_string()
        } else {
            e.to_string()
        };
        Self { status, message, code: e.code() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(status = %self.status, code = self.code, message = %self.message, "api error");
        (self.status, Json(ErrorBody { error: self.message, code: self.code })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_are_bad_requests() {
        for e in [CustomerError::DuplicatePhone, CustomerError::UnverifiedPhone, CustomerError::Validation("x".into())] {
            assert_eq!(ApiError::from(e).status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(ApiError::from(CustomerError::Unauthorized).status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = ApiError::from(CustomerError::Repository("password=hunter2 in dsn".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "internal server error");
        assert_eq!(api.code, 1200);
    }
}
