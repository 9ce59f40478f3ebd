//! Access-token verification → AuthCtx into request extensions.
//!
//! Every request passing through here either carries a verified bearer token
//! or is rejected: 401 for anything wrong with the token itself, 503 when the
//! provider's signing keys cannot be fetched and nothing is cached.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::access_jwt::AccessJwtError;
use crate::state::AppState;

/// Apply bearer-token authentication to a router (the `/api/v1` subtree).
///
/// Example:
/// ```ignore
/// let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8's from_fn cannot take a State extractor on its own, so the
    // state is passed explicitly via from_fn_with_state.
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

    // Signature + iss/aud/exp + strict claim checks happen in AuthService.
    let user = match state.auth.authenticate(token).await {
        Ok(user) => user,
        Err(AccessJwtError::KeysUnavailable(reason)) => {
            tracing::error!(%reason, "provider signing keys unavailable");
            return Err(AppError::ServiceUnavailable(
                "token verification temporarily unavailable",
            ));
        }
        Err(err) => {
            tracing::warn!(error = ?err, "access token verification failed");
            return Err(AppError::Unauthorized);
        }
    };

    // middleware → extractor hand-off
    req.extensions_mut()
        .insert(AuthCtx::new(user.subject, user.permissions));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Json, Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use super::apply;
    use crate::api::v1::extractors::{AuthCtxExtractor, RequireAdmin};
    use crate::services::auth::AuthService;
    use crate::services::auth::test_support::{
        AUDIENCE, ISSUER, KID, bearer_token, claims_for, mint, now_epoch_seconds, trusted_store,
    };
    use crate::state::AppState;

    async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<serde_json::Value> {
        Json(json!({ "user_id": ctx.user_id }))
    }

    async fn admin_only(RequireAdmin(ctx): RequireAdmin) -> Json<serde_json::Value> {
        Json(json!({ "user_id": ctx.user_id }))
    }

    fn test_app() -> Router {
        // connect_lazy: handlers under test never touch the pool.
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/payroll_test")
            .expect("lazy pool");
        let auth = Arc::new(AuthService::new(trusted_store(), ISSUER, AUDIENCE, 0));
        let state = AppState::new(db, auth);

        let protected = Router::new()
            .route("/users/me", get(me))
            .route("/payroll/summary", get(admin_only));
        let protected = apply(protected, state.clone());

        Router::new()
            .nest("/api/v1", protected)
            .with_state(state)
    }

    async fn request(app: Router, path: &str, bearer: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = builder.body(Body::empty()).expect("request");
        app.oneshot(req).await.expect("response").status()
    }

    #[tokio::test]
    async fn missing_authorization_header_is_401() {
        let status = request(test_app(), "/api/v1/users/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_401() {
        let app = test_app();
        let req = Request::builder()
            .uri("/api/v1/users/me")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .expect("request");
        let status = app.oneshot(req).await.expect("response").status();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_is_401_even_with_valid_claims() {
        let mut claims = claims_for("auth0|user1", &["admin"]);
        claims["exp"] = json!(now_epoch_seconds() - 3600);
        let token = mint(&claims, Some(KID));

        let status = request(test_app(), "/api/v1/users/me", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_authenticated_handler() {
        let token = bearer_token("auth0|user1", &[]);
        let status = request(test_app(), "/api/v1/users/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn token_without_admin_gets_403_on_admin_route() {
        let token = bearer_token("auth0|user1", &[]);
        let status = request(test_app(), "/api/v1/payroll/summary", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn token_with_admin_passes_admin_route() {
        let token = bearer_token("auth0|admin1", &["admin"]);
        let status = request(test_app(), "/api/v1/payroll/summary", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unrelated_permissions_do_not_grant_admin() {
        let token = bearer_token("auth0|user2", &["payroll:read", "time:write"]);
        let status = request(test_app(), "/api/v1/payroll/summary", Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn garbage_token_is_401() {
        let status = request(test_app(), "/api/v1/users/me", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
