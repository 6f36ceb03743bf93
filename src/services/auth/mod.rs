pub mod claims;
pub mod error;
pub mod factory;
pub mod guard;
pub mod jwks;
#[cfg(test)]
pub mod test_support;
pub mod verifier;

pub use claims::AuthClaims;
pub use error::AuthError;
pub use factory::build_token_verifier;
pub use guard::{authorize, permissions};
pub use verifier::{TokenVerifier, bearer_token};
