// rest_api/src/handlers/doctors.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use models::medical::{Doctor, DoctorInput, SlotInput};

use crate::errors::ApiResult;
use crate::handlers::{deleted, parse_id, SearchQuery};
use crate::middleware::AdminUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsRequest {
    #[serde(default)]
    pub available_slots: Vec<SlotInput>,
}

pub async fn list_doctors(State(state): State<AppState>) -> ApiResult<Json<Vec<Doctor>>> {
    Ok(Json(state.db.doctors.list().await?))
}

pub async fn search_doctors(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Doctor>>> {
    let fragment = query.fragment()?;
    Ok(Json(state.db.doctors.search(fragment).await?))
}

pub async fn doctors_by_specialty(
    State(state): State<AppState>,
    specialty: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<Doctor>>> {
    let Path(specialty) = specialty?;
    Ok(Json(state.db.doctors.by_specialty(&specialty).await?))
}

pub async fn get_doctor(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Doctor>> {
    let Path(id) = id?;
    let id = parse_id(&id, "doctor")?;
    Ok(Json(state.db.doctors.get(&id).await?))
}

pub async fn create_doctor(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<DoctorInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Doctor>)> {
    let Json(input) = payload?;
    let doctor = state.db.doctors.create(&input).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<DoctorInput>, JsonRejection>,
) -> ApiResult<Json<Doctor>> {
    let Path(id) = id?;
    let id = parse_id(&id, "doctor")?;
    let Json(input) = payload?;
    Ok(Json(state.db.doctors.update(&id, &input).await?))
}

pub async fn update_doctor_slots(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<SlotsRequest>, JsonRejection>,
) -> ApiResult<Json<Doctor>> {
    let Path(id) = id?;
    let id = parse_id(&id, "doctor")?;
    let Json(request) = payload?;
    Ok(Json(state.db.doctors.update_slots(&id, &request.available_slots).await?))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let id = parse_id(&id, "doctor")?;
    state.db.doctors.delete(&id).await?;
    Ok(deleted("Doctor"))
}
