//! HTTP middleware
//!
//! JWT authentication middleware and the `AuthUser` extractor.

pub mod auth;

pub use auth::{AuthError, AuthUser, HasJwtManager};
