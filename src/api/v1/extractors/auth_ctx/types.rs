/*
 * Responsibility
 * - The authenticated-context type handlers see
 * - The middleware verifies the token and stores this in request extensions;
 *   handlers only ever receive this type
 *
 * Notes
 * - Token verification lives in middleware/services; this is the contract type
 * - `user_id` is the identity provider's subject (e.g. "auth0|abc123"), not a
 *   local row id; the users table maps subject → profile when needed
 */

/// Permission claim gating the admin-only endpoints.
pub const ADMIN_PERMISSION: &str = "admin";

/// Context attached to every authenticated request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: String,
    pub permissions: Vec<String>,
}

impl AuthCtx {
    pub fn new(user_id: String, permissions: Vec<String>) -> Self {
        Self {
            user_id,
            permissions,
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.has_permission(ADMIN_PERMISSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_permission_set_is_not_admin() {
        let ctx = AuthCtx::new("auth0|user1".into(), vec![]);
        assert!(!ctx.is_admin());
    }

    #[test]
    fn admin_permission_is_recognized() {
        let ctx = AuthCtx::new("auth0|admin1".into(), vec!["admin".into()]);
        assert!(ctx.is_admin());
        assert!(ctx.has_permission("admin"));
        assert!(!ctx.has_permission("payroll:write"));
    }
}
