use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw access-token payload as issued by the identity provider.
///
/// `iss` / `aud` / `exp` are checked by `jsonwebtoken::Validation`; we only
/// keep what the application needs afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub exp: i64,

    // Absent when the API was registered without RBAC / permissions in token.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// 検証済みトークンから取り出した、リクエスト単位の認可情報 (永続化しない)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub subject: String,
    pub permissions: Option<BTreeSet<String>>,
    pub expires_at: DateTime<Utc>,
}

impl AuthClaims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|p| p.contains(permission))
    }
}
