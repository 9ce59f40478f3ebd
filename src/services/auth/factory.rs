/// Factory: build the `AuthService` (and its key cache) from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::services::auth::AuthService;
use crate::services::auth::jwks::JwksCache;

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.jwks_fetch_timeout_seconds))
        .build()
        .context("failed to build JWKS HTTP client")?;

    let jwks = JwksCache::new(
        http,
        config.jwks_url(),
        Duration::from_secs(config.jwks_cache_ttl_seconds),
    );

    Ok(Arc::new(AuthService::new(
        Arc::new(jwks),
        &config.issuer(),
        &config.auth0_audience,
        config.access_token_leeway_seconds,
    )))
}
