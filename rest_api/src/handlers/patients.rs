// rest_api/src/handlers/patients.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::medical::{Patient, PatientInput};

use crate::errors::ApiResult;
use crate::handlers::{deleted, parse_id, SearchQuery};
use crate::middleware::AuthUser;
use crate::AppState;

pub async fn list_patients(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Patient>>> {
    Ok(Json(state.db.patients.list().await?))
}

pub async fn search_patients(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Patient>>> {
    let fragment = query.fragment()?;
    Ok(Json(state.db.patients.search(fragment).await?))
}

pub async fn get_patient(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Patient>> {
    let Path(id) = id?;
    let id = parse_id(&id, "patient")?;
    Ok(Json(state.db.patients.get(&id).await?))
}

pub async fn create_patient(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let Json(input) = payload?;
    let patient = state.db.patients.create(&input).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// Serves both PUT and PATCH; only the fields present are applied.
pub async fn update_patient(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> ApiResult<Json<Patient>> {
    let Path(id) = id?;
    let id = parse_id(&id, "patient")?;
    let Json(input) = payload?;
    Ok(Json(state.db.patients.update(&id, &input).await?))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let id = parse_id(&id, "patient")?;
    state.db.patients.delete(&id).await?;
    Ok(deleted("Patient"))
}
