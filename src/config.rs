/*
 * Responsibility
 * - Environment / configuration loading (DATABASE_URL, Auth0, CORS, ...)
 * - Validation of configuration values (startup fails on missing/invalid)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
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

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // Identity provider (Auth0 tenant). The domain is the bare host,
    // e.g. "my-tenant.us.auth0.com"; issuer and JWKS URL are derived from it.
    pub auth0_domain: String,
    pub auth0_audience: String,

    pub access_token_leeway_seconds: u64,
    pub jwks_cache_ttl_seconds: u64,
    pub jwks_fetch_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth0_domain =
            std::env::var("AUTH0_DOMAIN").map_err(|_| ConfigError::Missing("AUTH0_DOMAIN"))?;
        let auth0_domain = auth0_domain.trim().trim_end_matches('/').to_string();
        if auth0_domain.is_empty() || auth0_domain.contains("://") {
            return Err(ConfigError::Invalid("AUTH0_DOMAIN"));
        }
        // The domain must embed into a well-formed https URL; this is what both
        // the issuer and the JWKS endpoint are built from.
        Url::parse(&format!("https://{}/", auth0_domain))
            .map_err(|_| ConfigError::Invalid("AUTH0_DOMAIN"))?;

        let auth0_audience =
            std::env::var("AUTH0_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH0_AUDIENCE"))?;
        if auth0_audience.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH0_AUDIENCE"));
        }

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let jwks_cache_ttl_seconds = std::env::var("JWKS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let jwks_fetch_timeout_seconds = std::env::var("JWKS_FETCH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth0_domain,
            auth0_audience,
            access_token_leeway_seconds,
            jwks_cache_ttl_seconds,
            jwks_fetch_timeout_seconds,
        })
    }

    /// Token issuer as Auth0 emits it: `https://{domain}/` (trailing slash included).
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth0_domain)
    }

    /// The tenant's published signing-key set.
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.auth0_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_domain(domain: &str) -> Config {
        Config {
            addr: SocketAddr::from_str("0.0.0.0:8000").unwrap(),
            database_url: "postgres://localhost/payroll".into(),
            app_env: AppEnv::Development,
            cors_allowed_origins: vec![],
            auth0_domain: domain.into(),
            auth0_audience: "https://payroll.example.com/api".into(),
            access_token_leeway_seconds: 60,
            jwks_cache_ttl_seconds: 600,
            jwks_fetch_timeout_seconds: 10,
        }
    }

    #[test]
    fn issuer_has_trailing_slash() {
        let config = config_with_domain("tenant.us.auth0.com");
        assert_eq!(config.issuer(), "https://tenant.us.auth0.com/");
    }

    #[test]
    fn jwks_url_points_at_well_known() {
        let config = config_with_domain("tenant.us.auth0.com");
        assert_eq!(
            config.jwks_url(),
            "https://tenant.us.auth0.com/.well-known/jwks.json"
        );
    }
}
