// rest_api/src/middleware.rs
//! Bearer-token extractors. Handlers opt into authentication by taking
//! `AuthUser` (any signed-in user) or `AdminUser` (role gate) as an argument.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use models::medical::User;
use security::roles::{require_role, ADMIN_ONLY};

use crate::errors::RestApiError;
use crate::AppState;

/// The user resolved from a valid `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// An authenticated user whose role is admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = RestApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        match state.auth.authenticate(&state.db.users, header).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(err) => {
                warn!("Rejected request to {}: {}", parts.uri.path(), err);
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = RestApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, ADMIN_ONLY)?;
        Ok(AdminUser(user))
    }
}
