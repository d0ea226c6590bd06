//! Common test utilities

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use userdesk::config::{Config, JwtConfig, KeycloakConfig};
use userdesk::jwt::JwtManager;
use userdesk::keycloak::KeycloakClient;
use userdesk::server::{build_router, AppState};
use userdesk::service::UserService;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-http-testing".to_string(),
        issuer: "https://userdesk.test".to_string(),
        access_token_ttl_secs: 3600,
    }
}

/// Create a test config with the given Keycloak base URL
pub fn create_test_config(keycloak_url: &str) -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 3000,
        jwt: test_jwt_config(),
        keycloak: KeycloakConfig {
            url: keycloak_url.to_string(),
            realm: "test".to_string(),
            admin_client_id: "admin-cli".to_string(),
            admin_client_secret: "test-secret".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
        },
    }
}

/// Build the production router backed by a real `KeycloakClient` pointed at
/// the given base URL (usually a wiremock server).
pub fn build_test_app(keycloak_url: &str) -> Router {
    let config = create_test_config(keycloak_url);
    let keycloak_client = KeycloakClient::new(config.keycloak.clone());
    let user_service = Arc::new(UserService::new(Arc::new(keycloak_client)));
    let jwt_manager = JwtManager::new(config.jwt.clone());

    let state = AppState {
        user_service,
        jwt_manager,
    };

    build_router(state)
}

/// Create an access token carrying the MODERATOR realm role
#[allow(dead_code)]
pub fn moderator_token(username: &str) -> String {
    token_with_roles(username, vec!["MODERATOR".to_string()])
}

/// Create an access token with the given realm roles
#[allow(dead_code)]
pub fn token_with_roles(username: &str, roles: Vec<String>) -> String {
    let jwt_manager = JwtManager::new(test_jwt_config());
    jwt_manager
        .issue(Uuid::new_v4(), username, roles)
        .expect("Failed to create test token")
}

/// Create an access token that expired two minutes ago
#[allow(dead_code)]
pub fn expired_token(username: &str) -> String {
    let mut config = test_jwt_config();
    config.access_token_ttl_secs = -120;
    let jwt_manager = JwtManager::new(config);
    jwt_manager
        .issue(Uuid::new_v4(), username, vec!["MODERATOR".to_string()])
        .expect("Failed to create test token")
}

/// Mock Keycloak server for testing
///
/// Simulates the slice of the Admin API the application talks to. The admin
/// token endpoint is always mounted; everything else is opt-in per test.
#[allow(dead_code)]
pub struct MockKeycloakServer {
    server: MockServer,
}

#[allow(dead_code)]
impl MockKeycloakServer {
    /// Create and start a new mock Keycloak server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let mock = Self { server };
        // Always set up the token endpoint
        mock.mock_token_endpoint().await;
        mock
    }

    /// Get the base URI of the mock server
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Mock the token endpoint (required for all authenticated requests)
    async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path("/realms/master/protocol/openid-connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-token",
                "expires_in": 300,
                "token_type": "Bearer"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock successful user creation, returning the given user ID
    pub async fn mock_create_user_success(&self, user_id: &str) {
        Mock::given(method("POST"))
            .and(path("/admin/realms/test/users"))
            .respond_with(ResponseTemplate::new(201).insert_header(
                "Location",
                format!("{}/admin/realms/test/users/{}", self.server.uri(), user_id),
            ))
            .mount(&self.server)
            .await;
    }

    /// Mock failed user creation with a JSON error body
    pub async fn mock_create_user_failure(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/admin/realms/test/users"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock failed user creation with an empty body
    pub async fn mock_create_user_failure_empty(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/admin/realms/test/users"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mock a user profile lookup
    pub async fn mock_user_profile(&self, user_id: Uuid, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/admin/realms/test/users/{}", user_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a failed user profile lookup
    pub async fn mock_user_profile_failure(
        &self,
        user_id: Uuid,
        status: u16,
        body: serde_json::Value,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/admin/realms/test/users/{}", user_id)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock the realm role mappings for a user
    pub async fn mock_role_mappings(&self, user_id: Uuid, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/admin/realms/test/users/{}/role-mappings",
                user_id
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a failed role mappings lookup with an empty body
    pub async fn mock_role_mappings_failure_empty(&self, user_id: Uuid, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/admin/realms/test/users/{}/role-mappings",
                user_id
            )))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mock the group memberships for a user
    pub async fn mock_groups(&self, user_id: Uuid, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/admin/realms/test/users/{}/groups", user_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

/// Make a GET request, optionally authenticated, and return status and raw body
#[allow(dead_code)]
pub async fn get_request(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    (status, String::from_utf8_lossy(&body_bytes).into_owned())
}

/// Make a POST request with a JSON body, optionally authenticated
#[allow(dead_code)]
pub async fn post_request(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> (StatusCode, String) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    (status, String::from_utf8_lossy(&body_bytes).into_owned())
}
