//! Error types for tally-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tally_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("Not logged in")]
    Unauthorized,

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::UserNotFound { .. } | CoreError::TransactionNotFound { .. } => ApiError::NotFound {
                resource: error.to_string(),
            },
            CoreError::Storage(_) | CoreError::PasswordHash(_) => {
                log::error!("[{}] {}", error.code(), error);
                ApiError::InternalError
            }
            other => ApiError::BadRequest {
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::UserNotFound { name: "x".to_string() }.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = CoreError::InvalidUpload { message: "Invalid file type".to_string() }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid file type");

        assert_eq!(ApiError::Unauthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Unauthorized.to_string(), "Not logged in");
    }
}
