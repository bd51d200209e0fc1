// lib/src/errors.rs

use thiserror::Error;

use bcrypt::BcryptError;
use bincode::error::{DecodeError, EncodeError};
use models::ValidationErrors;
use uuid::Error as UuidError;

#[derive(Debug, Error)]
pub enum HospitalError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Bincode decode error: {0}")]
    BincodeDecode(#[from] DecodeError),

    #[error("Bincode encode error: {0}")]
    BincodeEncode(#[from] EncodeError),

    #[error("Password hashing error: {0}")]
    PasswordHashingError(#[from] BcryptError),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, HospitalError>;

impl From<sled::Error> for HospitalError {
    fn from(err: sled::Error) -> Self {
        HospitalError::DatabaseError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for HospitalError {
    fn from(err: tokio::task::JoinError) -> Self {
        HospitalError::InternalError(format!("Async task join error: {}", err))
    }
}
