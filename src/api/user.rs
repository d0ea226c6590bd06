//! User API handlers
//!
//! Every handler guards explicitly with `policy::require_role` before
//! touching the service layer.

use crate::domain::UserCreationRequest;
use crate::error::Result;
use crate::keycloak::IdentityGateway;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, MODERATOR};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// Create a user in the realm
pub async fn create<G: IdentityGateway>(
    State(state): State<AppState<G>>,
    auth: AuthUser,
    Json(request): Json<UserCreationRequest>,
) -> Result<impl IntoResponse> {
    policy::require_role(&auth, MODERATOR)?;

    state.user_service.create_user(request).await?;
    Ok(StatusCode::OK)
}

/// Get a user's composite profile by ID
pub async fn get_by_id<G: IdentityGateway>(
    State(state): State<AppState<G>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    policy::require_role(&auth, MODERATOR)?;

    let profile = state.user_service.get_user_by_id(id).await?;
    Ok(Json(profile))
}

/// Return the authenticated caller's username as plain text
pub async fn hello(auth: AuthUser) -> Result<impl IntoResponse> {
    policy::require_role(&auth, MODERATOR)?;

    Ok(auth.username)
}
