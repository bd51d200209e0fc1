// rest_api/src/handlers/appointments.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use lib::RecentQuery;
use models::medical::{Appointment, AppointmentInput, AppointmentView, StatusInput};
use models::validation;

use crate::errors::{ApiResult, RestApiError};
use crate::handlers::{deleted, parse_id};
use crate::middleware::{AdminUser, AuthUser};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    Ok(Json(state.db.appointments.list().await?))
}

pub async fn recent_appointments(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    let Query(query) = query?;
    Ok(Json(state.db.appointments.recent(&query).await?))
}

pub async fn upcoming_appointments(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    let Query(query) = query?;
    Ok(Json(state.db.appointments.upcoming(query.limit).await?))
}

pub async fn appointments_by_date(
    State(state): State<AppState>,
    _user: AuthUser,
    date: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    let Path(date) = date?;
    let date = validation::parse_date(&date)
        .map_err(|_| RestApiError::BadRequest(format!("Invalid date: {}", date)))?;
    Ok(Json(state.db.appointments.by_date(date).await?))
}

pub async fn appointments_by_doctor(
    State(state): State<AppState>,
    _user: AuthUser,
    doctor_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    let Path(doctor_id) = doctor_id?;
    let doctor_id = parse_id(&doctor_id, "doctor")?;
    Ok(Json(state.db.appointments.by_doctor(&doctor_id).await?))
}

pub async fn appointments_by_patient(
    State(state): State<AppState>,
    _user: AuthUser,
    patient_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<AppointmentView>>> {
    let Path(patient_id) = patient_id?;
    let patient_id = parse_id(&patient_id, "patient")?;
    Ok(Json(state.db.appointments.by_patient(&patient_id).await?))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<AppointmentView>> {
    let Path(id) = id?;
    let id = parse_id(&id, "appointment")?;
    Ok(Json(state.db.appointments.get(&id).await?))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: Result<Json<AppointmentInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let Json(input) = payload?;
    let appointment = state.db.appointments.create(&input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<AppointmentInput>, JsonRejection>,
) -> ApiResult<Json<Appointment>> {
    let Path(id) = id?;
    let id = parse_id(&id, "appointment")?;
    let Json(input) = payload?;
    Ok(Json(state.db.appointments.update(&id, &input).await?))
}

pub async fn update_appointment_status(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<StatusInput>, JsonRejection>,
) -> ApiResult<Json<Appointment>> {
    let Path(id) = id?;
    let id = parse_id(&id, "appointment")?;
    let Json(input) = payload?;
    Ok(Json(state.db.appointments.update_status(&id, &input).await?))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let id = parse_id(&id, "appointment")?;
    state.db.appointments.delete(&id).await?;
    Ok(deleted("Appointment"))
}
