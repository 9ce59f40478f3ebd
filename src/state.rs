/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone is expected to be cheap (PgPool and Arc internally)
 */
use std::sync::Arc;

use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }
}
