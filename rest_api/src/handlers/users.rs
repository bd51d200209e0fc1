// rest_api/src/handlers/users.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;

use models::medical::{Login, UserInput, UserProfile};
use security::LoginResponse;

use crate::errors::ApiResult;
use crate::handlers::{deleted, parse_id};
use crate::middleware::{AdminUser, AuthUser};
use crate::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(login) = payload?;
    Ok(Json(state.auth.login(&state.db.users, &login).await?))
}

pub async fn current_user(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user.profile())
}

pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(input) = payload?;
    let user = state.db.users.create(&input).await?;
    Ok((StatusCode::CREATED, Json(user.profile())))
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = state.db.users.list().await?;
    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let Path(id) = id?;
    let id = parse_id(&id, "user")?;
    let Json(input) = payload?;
    Ok(Json(state.db.users.update(&id, &input).await?.profile()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let id = parse_id(&id, "user")?;
    state.db.users.delete(&id).await?;
    Ok(deleted("User"))
}
