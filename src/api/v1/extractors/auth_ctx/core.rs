use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::AuthCtx;

/// Extractor handing the AuthCtx to a handler.
///
/// The auth middleware must have inserted the ctx into request extensions;
/// its absence means the route is not behind the middleware → 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}

/// Extractor for admin-only handlers: authenticated AND holding the `admin`
/// permission claim. Authenticated-but-unprivileged → 403, not 401.
pub struct RequireAdmin(pub AuthCtx);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthCtxExtractor(ctx) = AuthCtxExtractor::from_request_parts(parts, state).await?;

        if !ctx.is_admin() {
            return Err(AppError::Forbidden("admin permission required"));
        }

        Ok(RequireAdmin(ctx))
    }
}
