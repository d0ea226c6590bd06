//! JWT authentication middleware and extractors
//!
//! Provides the `AuthUser` extractor for handlers requiring an
//! authenticated caller. Authorization (role checks) lives in the policy
//! module; this layer only establishes who the caller is.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::jwt::{AccessClaims, JwtManager};

/// State surface the extractor needs
pub trait HasJwtManager {
    fn jwt_manager(&self) -> &JwtManager;
}

/// Caller identity extracted from a verified access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID from the token's `sub` claim
    pub subject: Uuid,
    /// Username from the `preferred_username` claim
    pub username: String,
    /// Realm-level roles
    pub roles: Vec<String>,
}

impl AuthUser {
    /// Build the caller identity from verified claims
    pub fn from_claims(claims: AccessClaims) -> Result<Self, AuthError> {
        let subject = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;

        Ok(Self {
            subject,
            username: claims.preferred_username,
            roles: claims.realm_access.roles,
        })
    }

    /// Check if the caller carries a specific realm role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Authentication errors
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No Authorization header present
    MissingToken,
    /// Invalid Authorization header format
    InvalidHeader(String),
    /// Token validation failed
    InvalidToken(String),
    /// Token has expired
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            AuthError::InvalidHeader(_) => (StatusCode::UNAUTHORIZED, "Invalid authorization header"),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired"),
        };

        let body = serde_json::json!({
            "error": message,
            "code": "UNAUTHORIZED"
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Extract and validate Bearer token from Authorization header
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::InvalidHeader(
            "Authorization header must use Bearer scheme".to_string(),
        ));
    }

    Ok(&auth_header[7..])
}

/// Axum extractor for authenticated callers
///
/// Validates the JWT from the Authorization header and hands the caller's
/// identity to the handler.
///
/// # Example
///
/// ```ignore
/// async fn protected_handler(
///     auth: AuthUser,
///     State(state): State<AppState<KeycloakClient>>,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", auth.username)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthUser
where
    S: HasJwtManager + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state
            .jwt_manager()
            .verify(token)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        AuthUser::from_claims(claims)
    }
}
