//! Test fixtures: an RSA signing key, its published JWK, and a token builder.
use std::{net::TcpListener, sync::Arc, time::Duration};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;

use crate::services::auth::jwks::{HttpKeySetSource, KeySetSource, StaticKeySet};
use crate::services::auth::verifier::TokenVerifier;

pub const KID: &str = "coffee-test-key";
pub const ISSUER: &str = "https://coffee.test.auth0.com/";
pub const AUDIENCE: &str = "drinks";
pub const SUBJECT: &str = "auth0|barista";

const PRIVATE_KEY_PEM: &str = include_str!("testdata/rsa_private.pem");
const UNTRUSTED_PRIVATE_KEY_PEM: &str = include_str!("testdata/rsa_private_untrusted.pem");
const MODULUS: &str = include_str!("testdata/rsa_modulus.txt");

pub fn modulus() -> &'static str {
    MODULUS.trim()
}

pub fn key_set() -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": KID,
            "n": modulus(),
            "e": "AQAB"
        }]
    }))
    .expect("fixture jwk set")
}

pub fn verifier() -> TokenVerifier {
    verifier_with(Arc::new(StaticKeySet::new(key_set())))
}

pub fn verifier_with(source: Arc<dyn KeySetSource>) -> TokenVerifier {
    TokenVerifier::new(source, Algorithm::RS256, ISSUER, AUDIENCE, 0)
}

/// HTTP key-set source pointed at a local port nothing listens on
/// (connection refused).
pub fn unreachable_key_set() -> HttpKeySetSource {
    let port = TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("reserve local port")
        .port();
    let url = url::Url::parse(&format!("http://127.0.0.1:{port}/.well-known/jwks.json"))
        .expect("jwks url");
    HttpKeySetSource::new(url, Duration::from_secs(2)).expect("http client")
}

pub struct TokenSpec {
    pub permissions: Option<Vec<String>>,
    pub issuer: String,
    pub audience: String,
    pub kid: Option<String>,
    pub exp_offset_seconds: i64,
    pub untrusted_key: bool,
}

impl TokenSpec {
    pub fn with_permissions(permissions: &[&str]) -> Self {
        Self {
            permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
            issuer: ISSUER.to_string(),
            audience: AUDIENCE.to_string(),
            kid: Some(KID.to_string()),
            exp_offset_seconds: 3600,
            untrusted_key: false,
        }
    }
}

pub fn sign(spec: &TokenSpec) -> String {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "iss": spec.issuer,
        "aud": spec.audience,
        "sub": SUBJECT,
        "iat": now,
        "exp": now + spec.exp_offset_seconds,
    });
    if let Some(permissions) = &spec.permissions {
        claims["permissions"] = json!(permissions);
    }

    let pem = if spec.untrusted_key {
        UNTRUSTED_PRIVATE_KEY_PEM
    } else {
        PRIVATE_KEY_PEM
    };
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture rsa key");

    let mut header = Header::new(Algorithm::RS256);
    header.kid = spec.kid.clone();

    jsonwebtoken::encode(&header, &claims, &key).expect("sign fixture token")
}

pub fn token(permissions: &[&str]) -> String {
    sign(&TokenSpec::with_permissions(permissions))
}
