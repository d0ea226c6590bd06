//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::keycloak::{IdentityGateway, KeycloakClient};
use crate::middleware::HasJwtManager;
use crate::service::UserService;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
pub struct AppState<G: IdentityGateway> {
    pub user_service: Arc<UserService<G>>,
    pub jwt_manager: JwtManager,
}

// A derived Clone would bound G: Clone; the gateway is shared through the Arc.
impl<G: IdentityGateway> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            jwt_manager: self.jwt_manager.clone(),
        }
    }
}

impl<G: IdentityGateway> HasJwtManager for AppState<G> {
    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }
}

/// Build the HTTP router with a generic gateway type
///
/// This function is generic over the identity gateway, allowing it to work with
/// both the production `KeycloakClient` and test implementations of
/// `IdentityGateway`.
pub fn build_router<G: IdentityGateway + 'static>(state: AppState<G>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoint
        .route("/health", get(api::health::health))
        // User endpoints
        .route("/api/users", post(api::user::create::<G>))
        .route("/api/users/hello", get(api::user::hello))
        .route("/api/users/{id}", get(api::user::get_by_id::<G>))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    // Create Keycloak client
    let keycloak_client = KeycloakClient::new(config.keycloak.clone());

    // Create services
    let user_service = Arc::new(UserService::new(Arc::new(keycloak_client)));

    // Create JWT manager
    let jwt_manager = JwtManager::new(config.jwt.clone());

    // Create app state
    let state = AppState {
        user_service,
        jwt_manager,
    };

    let app = build_router(state);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
