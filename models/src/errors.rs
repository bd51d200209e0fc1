// models/src/errors.rs

use serde::{Deserialize, Serialize};
pub use thiserror::Error;

/// A single failed check, addressed by the dotted path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// Every field failure found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed on {} field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Records `message` against `path` when `failed` holds.
    pub fn check(&mut self, failed: bool, path: &str, message: &str) {
        if failed {
            self.push(path, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// Turns the collected failures into a result, yielding `value` when none were recorded.
    pub fn finish<T>(self, value: T) -> ValidationResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Failure to parse a single scalar value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid value provided: {0}")]
    InvalidValue(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

pub type ValidationResult<T> = Result<T, ValidationErrors>;
