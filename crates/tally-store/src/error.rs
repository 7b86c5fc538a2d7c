//! Error types for tally-store

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Data file not found: {path}")]
    NotFound { path: String },

    #[error("Invalid data file: {message}")]
    InvalidData { message: String },

    #[error("Invalid file type: {name}")]
    InvalidFileType { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::InvalidData {
            message: error.to_string(),
        }
    }
}
