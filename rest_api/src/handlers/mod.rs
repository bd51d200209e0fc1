// rest_api/src/handlers/mod.rs

pub mod appointments;
pub mod doctors;
pub mod patients;
pub mod stats;
pub mod users;

use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::validation;

use crate::errors::{ApiResult, RestApiError};

/// `?name=` query of the search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

impl SearchQuery {
    /// The trimmed fragment, or a 400 when it is missing or blank.
    pub fn fragment(&self) -> ApiResult<&str> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(RestApiError::BadRequest("Name parameter is required".to_string())),
        }
    }
}

pub fn parse_id(raw: &str, label: &str) -> ApiResult<Uuid> {
    validation::parse_uuid(raw)
        .map_err(|_| RestApiError::BadRequest(format!("Invalid {} ID format", label)))
}

pub fn deleted(label: &str) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted successfully", label) }))
}

pub async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}
