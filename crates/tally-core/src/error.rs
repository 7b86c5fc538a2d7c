//! Error types for tally-core

use serde::{Deserialize, Serialize};
use tally_store::StoreError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// User not found
    UserNotFound,
    /// Transaction not found
    TransactionNotFound,
    /// User already exists
    DuplicateUser,
    /// Validation error
    ValidationError,
    /// Uploaded file rejected
    InvalidUpload,
    /// Storage error
    StorageError,
    /// Password could not be hashed
    PasswordHashError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::UserNotFound => write!(f, "USER_NOT_FOUND"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::DuplicateUser => write!(f, "DUPLICATE_USER"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidUpload => write!(f, "INVALID_UPLOAD"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
            ErrorCode::PasswordHashError => write!(f, "PASSWORD_HASH_ERROR"),
        }
    }
}

/// Main error type for tally-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("User not found: {name}")]
    UserNotFound { name: String },

    #[error("Transaction {index} not found for {user}")]
    TransactionNotFound { user: String, index: usize },

    #[error("The user {name} already exists")]
    DuplicateUser { name: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{message}")]
    InvalidUpload { message: String },

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::UserNotFound { .. } => ErrorCode::UserNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::DuplicateUser { .. } => ErrorCode::DuplicateUser,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::InvalidUpload { .. } => ErrorCode::InvalidUpload,
            CoreError::Storage(_) => ErrorCode::StorageError,
            CoreError::PasswordHash(_) => ErrorCode::PasswordHashError,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidFileType { .. } => CoreError::InvalidUpload {
                message: "Invalid file type".to_string(),
            },
            other => CoreError::Storage(other),
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
