/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// 検証側 (resource server) としての token 設定
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: url::Url,
    pub algorithm: Algorithm,
    pub leeway_seconds: u64,
    pub jwks_timeout_seconds: u64,
}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub db_reset_on_start: bool,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let db_reset_on_start = std::env::var("DB_RESET_ON_START")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let issuer = match std::env::var("AUTH_ISSUER") {
            Ok(issuer) => issuer,
            Err(_) => {
                let domain = std::env::var("AUTH0_DOMAIN")
                    .map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;
                issuer_from_domain(&domain)
            }
        };

        let audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let jwks_url = match std::env::var("AUTH_JWKS_URL") {
            Ok(raw) => url::Url::parse(&raw).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?,
            Err(_) => default_jwks_url(&issuer)?,
        };

        let algorithm = parse_algorithm(
            &std::env::var("AUTH_ALGORITHM").unwrap_or_else(|_| "RS256".to_string()),
        )?;

        let leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let jwks_timeout_seconds = std::env::var("AUTH_JWKS_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            db_reset_on_start,
            app_env,
            cors_allowed_origins,
            auth: AuthConfig {
                issuer,
                audience,
                jwks_url,
                algorithm,
                leeway_seconds,
                jwks_timeout_seconds,
            },
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Auth0 の issuer は末尾スラッシュ付き: https://<domain>/
fn issuer_from_domain(domain: &str) -> String {
    let domain = domain
        .trim()
        .trim_start_matches("https://")
        .trim_end_matches('/');
    format!("https://{}/", domain)
}

fn default_jwks_url(issuer: &str) -> Result<url::Url, ConfigError> {
    let base = if issuer.ends_with('/') {
        issuer.to_string()
    } else {
        format!("{}/", issuer)
    };

    url::Url::parse(&base)
        .and_then(|u| u.join(".well-known/jwks.json"))
        .map_err(|_| ConfigError::Invalid("AUTH_ISSUER"))
}

/// 非対称アルゴリズムのみ許可する (HS* は設定エラー)
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let alg = Algorithm::from_str(raw.trim()).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHM"))?;

    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Err(ConfigError::Invalid("AUTH_ALGORITHM"))
        }
        _ => Ok(alg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_is_built_from_bare_domain() {
        assert_eq!(issuer_from_domain("coffee.us.auth0.com"), "https://coffee.us.auth0.com/");
        assert_eq!(
            issuer_from_domain("https://coffee.us.auth0.com/"),
            "https://coffee.us.auth0.com/"
        );
    }

    #[test]
    fn jwks_url_defaults_to_well_known_path() {
        let url = default_jwks_url("https://coffee.us.auth0.com/").unwrap();
        assert_eq!(url.as_str(), "https://coffee.us.auth0.com/.well-known/jwks.json");

        let url = default_jwks_url("https://idp.example.com/tenant").unwrap();
        assert_eq!(url.as_str(), "https://idp.example.com/tenant/.well-known/jwks.json");
    }

    #[test]
    fn symmetric_algorithms_are_rejected() {
        assert_eq!(parse_algorithm("RS256"), Ok(Algorithm::RS256));
        assert_eq!(parse_algorithm("EdDSA"), Ok(Algorithm::EdDSA));
        assert_eq!(
            parse_algorithm("HS256"),
            Err(ConfigError::Invalid("AUTH_ALGORITHM"))
        );
        assert_eq!(
            parse_algorithm("none"),
            Err(ConfigError::Invalid("AUTH_ALGORITHM"))
        );
    }

    #[test]
    fn app_env_and_flags() {
        assert!(AppEnv::parse("PROD").is_production());
        assert!(!AppEnv::parse("staging").is_production());
        assert!(parse_flag("True"));
        assert!(!parse_flag("0"));
        assert_eq!(
            split_list(" https://a.test, ,https://b.test"),
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
    }
}
