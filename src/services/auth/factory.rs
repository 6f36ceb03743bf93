/// Factory: build `TokenVerifier` from application `Config`.
use std::{sync::Arc, time::Duration};

use crate::config::AuthConfig;
use crate::services::auth::TokenVerifier;
use crate::services::auth::jwks::{HttpKeySetSource, KeySetError};

pub fn build_token_verifier(config: &AuthConfig) -> Result<Arc<TokenVerifier>, KeySetError> {
    let source = HttpKeySetSource::new(
        config.jwks_url.clone(),
        Duration::from_secs(config.jwks_timeout_seconds),
    )?;

    let verifier = TokenVerifier::new(
        Arc::new(source),
        config.algorithm,
        &config.issuer,
        &config.audience,
        config.leeway_seconds,
    );

    Ok(Arc::new(verifier))
}
