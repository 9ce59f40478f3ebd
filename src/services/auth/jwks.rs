//! Provider signing-key set: JWKS document model, key-store abstraction, and
//! the process-wide cache of keys fetched from the identity provider.
//!
//! The cache is an explicitly owned structure (no module-level state). Readers
//! work against an `Arc` snapshot; a refresh builds a replacement off-lock and
//! swaps it in, so in-flight requests never wait on the network except when the
//! cache is cold. Refreshes are triggered by TTL expiry or by a token carrying
//! an unknown `kid`, and are rate-limited so a stream of bad key ids cannot
//! hammer the provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("no signing key with id '{0}'")]
    UnknownKeyId(String),
    #[error("signing keys unavailable: {0}")]
    Unavailable(String),
}

/// Source of token-verification keys, addressed by JWT header `kid`.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, KeyStoreError>;
}

/// Static key set. Used for locally-managed keys and in tests.
#[async_trait]
impl KeyStore for HashMap<String, DecodingKey> {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, KeyStoreError> {
        self.get(kid)
            .cloned()
            .ok_or_else(|| KeyStoreError::UnknownKeyId(kid.to_string()))
    }
}

/// One entry of the provider's published JWKS document. Fields we do not
/// verify with (x5c, x5t, ...) are ignored at the serde level.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    // RSA public components, base64url.
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

impl Jwk {
    /// RS256 RSA signature key with a kid and both public components present.
    /// Everything else (encryption keys, EC keys, kid-less entries) is skipped.
    pub fn is_usable_signing_key(&self) -> bool {
        self.kty == "RSA"
            && self.key_use.as_deref() != Some("enc")
            && self.alg.as_deref().unwrap_or("RS256") == "RS256"
            && self.kid.is_some()
            && self.n.is_some()
            && self.e.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn signing_keys(&self) -> impl Iterator<Item = &Jwk> {
        self.keys.iter().filter(|k| k.is_usable_signing_key())
    }
}

struct Snapshot {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

fn index_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::new();
    for jwk in set.signing_keys() {
        // Checked by is_usable_signing_key.
        let (kid, n, e) = match (&jwk.kid, &jwk.n, &jwk.e) {
            (Some(kid), Some(n), Some(e)) => (kid, n, e),
            _ => continue,
        };
        match DecodingKey::from_rsa_components(n, e) {
            Ok(key) => {
                keys.insert(kid.clone(), key);
            }
            Err(err) => {
                tracing::warn!(kid = %kid, error = %err, "skipping unparsable JWKS entry");
            }
        }
    }
    keys
}

/// Cached remote key set, refreshed from the provider's JWKS endpoint.
pub struct JwksCache {
    http: reqwest::Client,
    url: String,
    ttl: Duration,
    refresh_cooldown: Duration,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    // Serializes refreshes; holds the instant of the last attempt so
    // concurrent misses and repeated failures collapse into one fetch.
    refresh_gate: Mutex<Option<Instant>>,
}

impl JwksCache {
    const REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

    pub fn new(http: reqwest::Client, url: String, ttl: Duration) -> Self {
        Self {
            http,
            url,
            ttl,
            refresh_cooldown: Self::REFRESH_COOLDOWN,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(None),
        }
    }

    async fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    async fn fetch(&self) -> Result<Arc<Snapshot>, KeyStoreError> {
        let set: JwkSet = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| KeyStoreError::Unavailable(err.to_string()))?
            .json()
            .await
            .map_err(|err| KeyStoreError::Unavailable(err.to_string()))?;

        let keys = index_keys(&set);
        if keys.is_empty() {
            return Err(KeyStoreError::Unavailable(
                "provider key set contains no usable signing keys".to_string(),
            ));
        }

        let snapshot = Arc::new(Snapshot {
            keys,
            fetched_at: Instant::now(),
        });
        *self.snapshot.write().await = Some(snapshot.clone());
        tracing::debug!(keys = snapshot.keys.len(), "refreshed provider key set");
        Ok(snapshot)
    }

    fn lookup(snapshot: &Snapshot, kid: &str) -> Result<DecodingKey, KeyStoreError> {
        snapshot
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| KeyStoreError::UnknownKeyId(kid.to_string()))
    }
}

#[async_trait]
impl KeyStore for JwksCache {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, KeyStoreError> {
        // Fast path: fresh snapshot that knows this kid.
        if let Some(snapshot) = self.current().await
            && snapshot.fetched_at.elapsed() < self.ttl
            && let Some(key) = snapshot.keys.get(kid)
        {
            return Ok(key.clone());
        }

        // Stale snapshot or unknown kid: at most one refresh per validation.
        let mut last_attempt = self.refresh_gate.lock().await;

        if last_attempt.is_some_and(|at| at.elapsed() < self.refresh_cooldown) {
            // Someone just refreshed (or just failed to); don't hit the
            // provider again, answer from whatever we hold.
            return match self.current().await {
                Some(snapshot) => Self::lookup(&snapshot, kid),
                None => Err(KeyStoreError::Unavailable(
                    "signing keys not yet fetched".to_string(),
                )),
            };
        }
        *last_attempt = Some(Instant::now());

        match self.fetch().await {
            Ok(snapshot) => Self::lookup(&snapshot, kid),
            Err(err) => match self.current().await {
                // Refresh failed but we have a previous key set: serve stale.
                // Keys rotate rarely; a provider outage should not take down
                // every authenticated request.
                Some(snapshot) => {
                    tracing::warn!(error = %err, "JWKS refresh failed, serving cached keys");
                    Self::lookup(&snapshot, kid)
                }
                // Cold cache: fail closed.
                None => Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH0_STYLE_JWKS: &str = r#"{
        "keys": [
            {
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": "key-a",
                "n": "xGKvQyK1xUYVcD0AJ1sVQ",
                "e": "AQAB",
                "x5t": "ignored",
                "x5c": ["ignored"]
            },
            {
                "kty": "RSA",
                "use": "enc",
                "kid": "key-enc",
                "n": "xGKvQyK1xUYVcD0AJ1sVQ",
                "e": "AQAB"
            },
            {
                "kty": "EC",
                "use": "sig",
                "kid": "key-ec",
                "crv": "P-256"
            },
            {
                "kty": "RSA",
                "use": "sig",
                "n": "no-kid-on-this-one",
                "e": "AQAB"
            }
        ]
    }"#;

    #[test]
    fn parses_provider_document_and_ignores_extra_fields() {
        let set: JwkSet = serde_json::from_str(AUTH0_STYLE_JWKS).expect("parse jwks");
        assert_eq!(set.keys.len(), 4);
    }

    #[test]
    fn only_rsa_signing_keys_with_kid_are_usable() {
        let set: JwkSet = serde_json::from_str(AUTH0_STYLE_JWKS).expect("parse jwks");
        let usable: Vec<_> = set.signing_keys().collect();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].kid.as_deref(), Some("key-a"));
    }

    #[tokio::test]
    async fn static_store_rejects_unknown_kid() {
        let store: HashMap<String, DecodingKey> = HashMap::new();
        let err = store.decoding_key("nope").await.expect_err("unknown kid");
        assert!(matches!(err, KeyStoreError::UnknownKeyId(_)));
    }
}
