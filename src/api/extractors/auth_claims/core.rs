use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthClaims, AuthError};
use crate::state::AppState;

/// Handler で、検証済みの AuthClaims を受け取るための extractor
/// gate middleware が AuthClaims を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（route に gate が掛かっていない）
pub struct Authenticated(pub AuthClaims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthClaims>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| AuthError::missing_header().into())
    }
}
