// security/src/roles.rs
use models::medical::{Role, User};

use crate::AuthError;

/// Roles allowed on admin-only endpoints.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Rejects `user` unless its role is one of `allowed`.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::warn!("User {} with role {} denied; needs one of {:?}", user.id, user.role, allowed);
        Err(AuthError::Forbidden)
    }
}
