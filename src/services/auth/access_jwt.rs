use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::Deserialize;
use thiserror::Error;

use crate::services::auth::jwks::{KeyStore, KeyStoreError};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug, Error)]
pub enum AccessJwtError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
    #[error("audience mismatch")]
    WrongAudience,
    #[error("issuer mismatch")]
    WrongIssuer,
    #[error("missing or empty 'sub' claim")]
    MissingSubject,
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
    #[error("no signing key with id '{0}'")]
    UnknownKeyId(String),
    #[error("signing keys unavailable: {0}")]
    KeysUnavailable(String),
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidAudience => Self::WrongAudience,
            ErrorKind::InvalidIssuer => Self::WrongIssuer,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::SignatureInvalid,
            _ => Self::Malformed,
        }
    }
}

impl From<KeyStoreError> for AccessJwtError {
    fn from(e: KeyStoreError) -> Self {
        match e {
            KeyStoreError::UnknownKeyId(kid) => Self::UnknownKeyId(kid),
            KeyStoreError::Unavailable(message) => Self::KeysUnavailable(message),
        }
    }
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        // Typical: aud is a string
        serde_json::Value::String(s) => !s.trim().is_empty(),
        // Also valid: aud is an array of strings
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token (JWT) claims as the identity provider emits them.
///
/// NOTE:
/// - `aud` in a JWT can be either string or array; jsonwebtoken validates it
///   via `Validation::set_audience`, we only re-check presence.
/// - `permissions` is the provider's RBAC claim; absent means "no permissions".
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    // Keep as Value to accept both string and array.
    #[serde(default)]
    pub aud: serde_json::Value,

    #[serde(default)]
    pub sub: Option<String>,
    pub exp: u64,

    #[serde(default)]
    pub nbf: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,

    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// Verified identity handed to the rest of the application.
///
/// Request-scoped: built per request from the verified claims, never stored.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub permissions: Vec<String>,
}

/// RS256 access-token verifier backed by the provider's key set.
pub struct AuthService {
    key_store: Arc<dyn KeyStore>,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        key_store: Arc<dyn KeyStore>,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Self {
            key_store,
            validation,
        }
    }

    /// Verify signature / iss / aud / exp and decode the claims.
    ///
    /// The signing key is resolved through the key store by the token's `kid`;
    /// an unknown kid triggers (at most) one key-set refresh upstream.
    pub async fn verify(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let header = decode_header(token).map_err(|_| AccessJwtError::Malformed)?;
        let kid = header.kid.as_deref().ok_or(AccessJwtError::Malformed)?;

        let key = self.key_store.decoding_key(kid).await?;
        let data = decode::<AccessTokenClaims>(token, &key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation.
    ///
    /// `jsonwebtoken::Validation` already checks signature, `exp`, `iss` and
    /// `aud` (because we set them). This additionally requires a non-empty
    /// `sub` and a usable `aud` shape.
    pub async fn verify_strict(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let claims = self.verify(token).await?;

        // Required (non-empty) checks. Validation already matched iss/aud/exp
        // against the configured values; this defends against meaningless ones.
        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AccessJwtError::WrongAudience);
        }
        match claims.sub.as_deref() {
            Some(sub) if !sub.trim().is_empty() => {}
            _ => return Err(AccessJwtError::MissingSubject),
        }

        Ok(claims)
    }

    /// Verify and convert claims into the application-facing identity.
    ///
    /// This is the entry point for the auth middleware.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AccessJwtError> {
        let claims = self.verify_strict(token).await?;

        // Presence checked by verify_strict.
        let subject = claims.sub.unwrap_or_default();

        Ok(AuthenticatedUser {
            subject,
            permissions: claims.permissions.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use jsonwebtoken::DecodingKey;
    use serde_json::json;

    use super::*;
    use crate::services::auth::test_support::{
        AUDIENCE, ISSUER, KID, mint, now_epoch_seconds, trusted_store,
    };

    fn service() -> AuthService {
        AuthService::new(trusted_store(), ISSUER, AUDIENCE, 0)
    }

    fn standard_claims() -> serde_json::Value {
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "auth0|user1",
            "exp": now_epoch_seconds() + 600,
            "iat": now_epoch_seconds(),
            "permissions": ["admin"],
        })
    }

    #[tokio::test]
    async fn valid_token_yields_subject_and_permissions() {
        let token = mint(&standard_claims(), Some(KID));
        let user = service().authenticate(&token).await.expect("verify token");
        assert_eq!(user.subject, "auth0|user1");
        assert_eq!(user.permissions, vec!["admin".to_string()]);
    }

    #[tokio::test]
    async fn absent_permissions_claim_defaults_to_empty() {
        let mut claims = standard_claims();
        claims.as_object_mut().unwrap().remove("permissions");
        let token = mint(&claims, Some(KID));

        let user = service().authenticate(&token).await.expect("verify token");
        assert!(user.permissions.is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut claims = standard_claims();
        claims["exp"] = json!(now_epoch_seconds() - 3600);
        let token = mint(&claims, Some(KID));

        let err = service().authenticate(&token).await.expect_err("expired");
        assert!(matches!(err, AccessJwtError::Expired));
    }

    #[tokio::test]
    async fn expiry_within_leeway_is_accepted() {
        let mut claims = standard_claims();
        claims["exp"] = json!(now_epoch_seconds() - 30);
        let token = mint(&claims, Some(KID));

        let service = AuthService::new(trusted_store(), ISSUER, AUDIENCE, 60);
        service.authenticate(&token).await.expect("within leeway");
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut claims = standard_claims();
        claims["aud"] = json!("https://some-other-api.example.com");
        let token = mint(&claims, Some(KID));

        let err = service().authenticate(&token).await.expect_err("bad aud");
        assert!(matches!(err, AccessJwtError::WrongAudience));
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let mut claims = standard_claims();
        claims["iss"] = json!("https://evil.example.com/");
        let token = mint(&claims, Some(KID));

        let err = service().authenticate(&token).await.expect_err("bad iss");
        assert!(matches!(err, AccessJwtError::WrongIssuer));
    }

    #[tokio::test]
    async fn missing_subject_is_rejected() {
        let mut claims = standard_claims();
        claims.as_object_mut().unwrap().remove("sub");
        let token = mint(&claims, Some(KID));

        let err = service().authenticate(&token).await.expect_err("no sub");
        assert!(matches!(err, AccessJwtError::MissingSubject));
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = mint(&standard_claims(), Some("rotated-away"));
        let err = service().authenticate(&token).await.expect_err("bad kid");
        assert!(matches!(err, AccessJwtError::UnknownKeyId(_)));
    }

    #[tokio::test]
    async fn token_without_kid_is_rejected() {
        let token = mint(&standard_claims(), None);
        let err = service().authenticate(&token).await.expect_err("no kid");
        assert!(matches!(err, AccessJwtError::Malformed));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let err = service()
            .authenticate("not-a-jwt")
            .await
            .expect_err("garbage");
        assert!(matches!(err, AccessJwtError::Malformed));
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let mut token = mint(&standard_claims(), Some(KID));
        let last = if token.ends_with('Q') { 'A' } else { 'Q' };
        token.pop();
        token.push(last);

        let err = service().authenticate(&token).await.expect_err("tampered");
        assert!(matches!(err, AccessJwtError::SignatureInvalid));
    }

    #[tokio::test]
    async fn token_from_untrusted_key_is_rejected() {
        // Key store trusts a different RSA modulus under the same kid, so a
        // token from our signer must never verify.
        let mut keys = HashMap::new();
        let foreign_n = format!("t{}Q", "A".repeat(340));
        keys.insert(
            KID.to_string(),
            DecodingKey::from_rsa_components(&foreign_n, "AQAB").expect("foreign key"),
        );
        let store: Arc<dyn KeyStore> = Arc::new(keys);
        let service = AuthService::new(store, ISSUER, AUDIENCE, 0);

        let token = mint(&standard_claims(), Some(KID));
        let err = service.authenticate(&token).await.expect_err("untrusted");
        assert!(matches!(
            err,
            AccessJwtError::SignatureInvalid | AccessJwtError::Malformed
        ));
    }
}
