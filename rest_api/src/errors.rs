// rest_api/src/errors.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use lib::errors::HospitalError;
use security::AuthError;

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Hospital(#[from] HospitalError),
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),
    #[error("Invalid path parameter: {0}")]
    Path(#[from] PathRejection),
    #[error("{0}")]
    BadRequest(String),
}

impl From<AuthError> for RestApiError {
    fn from(err: AuthError) -> Self {
        RestApiError::Hospital(err.into())
    }
}

pub type ApiResult<T> = Result<T, RestApiError>;

fn body(message: impl Into<String>, details: Option<Value>) -> Json<Value> {
    match details {
        Some(details) => Json(json!({ "error": message.into(), "details": details })),
        None => Json(json!({ "error": message.into() })),
    }
}

// Implement IntoResponse for RestApiError to convert it into an HTTP response
impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RestApiError::Hospital(err) => match err {
                HospitalError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    body("Validation failed", Some(json!(errors.fields()))),
                ),
                HospitalError::BadRequest(msg) => (StatusCode::BAD_REQUEST, body(msg, None)),
                HospitalError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, body(msg, None)),
                HospitalError::Forbidden(msg) => (StatusCode::FORBIDDEN, body(msg, None)),
                HospitalError::NotFound(msg) => (StatusCode::NOT_FOUND, body(msg, None)),
                HospitalError::Conflict(msg) => (StatusCode::CONFLICT, body(msg, None)),
                other => {
                    error!("Internal error: {}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, body("Internal server error", None))
                }
            },
            RestApiError::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                body("Invalid JSON body", Some(json!(rejection.body_text()))),
            ),
            RestApiError::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                body("Invalid query parameters", Some(json!(rejection.body_text()))),
            ),
            RestApiError::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                body("Invalid path parameter", Some(json!(rejection.body_text()))),
            ),
            RestApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, body(msg, None)),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::ValidationErrors;

    #[test]
    fn should_map_domain_errors_to_status_codes() {
        let cases = [
            (HospitalError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (HospitalError::Conflict("x".into()), StatusCode::CONFLICT),
            (HospitalError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (HospitalError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (HospitalError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (HospitalError::DatabaseError("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(RestApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn should_render_validation_details() {
        let mut errors = ValidationErrors::new();
        errors.push("time", "Time must be in HH:MM format (24-hour)");
        let response = RestApiError::from(HospitalError::Validation(errors)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["error"], "Validation failed");
        assert_eq!(value["details"][0]["path"], "time");
    }
}
