//! Centralized authorization policy for HTTP handlers.
//!
//! Authorization is an explicit step: every protected handler calls
//! `require_role` before doing any work. There is no route-level
//! enforcement hidden in the router.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;

/// Realm role allowed to manage users
pub const MODERATOR: &str = "MODERATOR";

pub type PolicyResult<T> = std::result::Result<T, AppError>;

/// Require the caller to hold the given realm role.
///
/// Refusal carries no detail; the response is a bare 403.
pub fn require_role(auth: &AuthUser, role: &str) -> PolicyResult<()> {
    if auth.has_role(role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
