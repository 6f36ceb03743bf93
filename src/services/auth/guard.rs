//! Permission guard: pure allow/deny decision on a verified claim set.
use crate::services::auth::claims::AuthClaims;
use crate::services::auth::error::AuthError;

pub mod permissions {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

pub fn authorize(claims: &AuthClaims, required: &str) -> Result<(), AuthError> {
    if claims.permissions.is_none() {
        return Err(AuthError::permissions_not_included());
    }

    if claims.has_permission(required) {
        Ok(())
    } else {
        Err(AuthError::forbidden())
    }
}
