use std::{str::FromStr, sync::Arc};

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;

use crate::services::auth::claims::{AccessTokenClaims, AuthClaims};
use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::{KeySetCache, KeySetSource};

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is compared case-insensitively; anything but exactly two
/// space-separated parts is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AuthError::missing_header)?
        .to_str()
        .map_err(|_| AuthError::not_bearer())?;

    let parts: Vec<&str> = raw.split(' ').collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::not_bearer()),
        [_] | [_, ""] => Err(AuthError::token_not_found()),
        [_, token] => Ok(*token),
        _ => Err(AuthError::not_bearer_token()),
    }
}

// JOSE header as sent, before jsonwebtoken narrows `alg` to its own enum
// (which cannot represent `none`).
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

fn peek_header(token: &str) -> Result<RawHeader, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::unparsable());
    };

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::unparsable())?;

    serde_json::from_slice(&bytes).map_err(|_| AuthError::unparsable())
}

/// Access-token verifier against the signing authority's published keys.
///
/// - Exactly one (asymmetric) algorithm is accepted.
/// - `iss`, `aud`, `exp` and `sub` are required.
/// - Key material is intentionally not printable via Debug.
pub struct TokenVerifier {
    keys: KeySetCache,
    algorithm: Algorithm,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys)
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        source: Arc<dyn KeySetSource>,
        algorithm: Algorithm,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            keys: KeySetCache::new(source),
            algorithm,
            validation,
        }
    }

    pub async fn verify(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let header = peek_header(token)?;

        // `none`, HS* and anything else than the configured algorithm.
        match Algorithm::from_str(&header.alg) {
            Ok(alg) if alg == self.algorithm => {}
            _ => return Err(AuthError::unexpected_algorithm()),
        }

        let kid = header.kid.ok_or_else(AuthError::malformed)?;

        let key = match self.keys.get(&kid).await {
            Ok(Some(key)) => key,
            Ok(None) => return Err(AuthError::unknown_key()),
            Err(err) => {
                // fail-closed: key set を取れなければ検証できない
                tracing::warn!(error = %err, "signing key set fetch failed");
                return Err(AuthError::unknown_key());
            }
        };

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &self.validation)
            .map_err(|e| AuthError::from(&e))?;
        let claims = data.claims;

        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or_else(AuthError::incorrect_claims)?;

        Ok(AuthClaims {
            subject: claims.sub,
            permissions: claims.permissions.map(|p| p.into_iter().collect()),
            expires_at,
        })
    }
}
