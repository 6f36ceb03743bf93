//! Authorization failures and their HTTP surface.
//!
//! Every failure carries its own status code and a human readable description;
//! the error normalizer copies both into the response envelope unchanged.
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    MissingHeader,
    InvalidHeader,
    InvalidSignature,
    Expired,
    InvalidClaims,
    Forbidden,
}

impl AuthErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::InvalidHeader => "invalid_header",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "token_expired",
            Self::InvalidClaims => "invalid_claims",
            Self::Forbidden => "unauthorized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .kind.code(), .description)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub description: &'static str,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, description: &'static str) -> Self {
        Self { kind, description }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn missing_header() -> Self {
        Self::new(
            AuthErrorKind::MissingHeader,
            "Authorization header is expected.",
        )
    }

    pub fn not_bearer() -> Self {
        Self::new(
            AuthErrorKind::InvalidHeader,
            "Authorization header must start with \"Bearer\".",
        )
    }

    pub fn token_not_found() -> Self {
        Self::new(AuthErrorKind::InvalidHeader, "Token not found.")
    }

    pub fn not_bearer_token() -> Self {
        Self::new(
            AuthErrorKind::InvalidHeader,
            "Authorization header must be bearer token.",
        )
    }

    pub fn malformed() -> Self {
        Self::new(AuthErrorKind::InvalidHeader, "Authorization malformed.")
    }

    pub fn unparsable() -> Self {
        Self::new(
            AuthErrorKind::InvalidHeader,
            "Unable to parse authentication token.",
        )
    }

    pub fn unknown_key() -> Self {
        Self::new(
            AuthErrorKind::InvalidSignature,
            "Unable to find the appropriate key.",
        )
    }

    pub fn bad_signature() -> Self {
        Self::new(
            AuthErrorKind::InvalidSignature,
            "Token signature could not be verified.",
        )
    }

    pub fn expired() -> Self {
        Self::new(AuthErrorKind::Expired, "Token expired.")
    }

    pub fn incorrect_claims() -> Self {
        Self::new(
            AuthErrorKind::InvalidClaims,
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    pub fn unexpected_algorithm() -> Self {
        Self::new(
            AuthErrorKind::InvalidClaims,
            "Token signing algorithm is not accepted.",
        )
    }

    pub fn permissions_not_included() -> Self {
        Self::new(
            AuthErrorKind::InvalidClaims,
            "Permissions not included in JWT.",
        )
    }

    pub fn forbidden() -> Self {
        Self::new(AuthErrorKind::Forbidden, "Permission not found.")
    }
}

impl From<&jsonwebtoken::errors::Error> for AuthError {
    fn from(e: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => Self::expired(),
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                Self::unexpected_algorithm()
            }
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::incorrect_claims(),
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidKeyFormat => Self::bad_signature(),
            _ => Self::unparsable(),
        }
    }
}
