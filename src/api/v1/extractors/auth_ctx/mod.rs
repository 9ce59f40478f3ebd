/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the authenticated request context (AuthCtx) to handlers
 * - Keep HTTP / axum wiring in core, the contract type in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 * - RequireAdmin
 */

mod core;
mod types;

pub use core::{AuthCtxExtractor, RequireAdmin};
pub use types::AuthCtx;
