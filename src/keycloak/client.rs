//! Keycloak Admin API client
//!
//! Wraps the handful of Admin REST calls the application needs: obtaining
//! and caching an admin token, creating a user, and reading a user's
//! profile, realm role mappings and group memberships.

use crate::config::KeycloakConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::types::*;

/// Operations the user service needs from the identity backend.
///
/// Everything Keycloak-specific (admin tokens, URL layout, response
/// envelopes) stays behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Create a user and return the id Keycloak assigned to it
    async fn create_user(&self, user: &UserRepresentation) -> Result<String>;

    /// Fetch a single user's profile
    async fn fetch_profile(&self, user_id: Uuid) -> Result<UserRepresentation>;

    /// Fetch the user's realm role mappings and group memberships
    async fn fetch_roles_and_groups(
        &self,
        user_id: Uuid,
    ) -> Result<(Vec<RoleRepresentation>, Vec<GroupRepresentation>)>;
}

/// Keycloak Admin API client
#[derive(Clone)]
pub struct KeycloakClient {
    config: KeycloakConfig,
    http_client: Client,
    token: Arc<RwLock<Option<AdminToken>>>,
}

#[derive(Debug, Clone)]
struct AdminToken {
    access_token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl KeycloakClient {
    /// Create a new Keycloak client
    pub fn new(config: KeycloakConfig) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get admin access token (with caching)
    async fn get_admin_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let token = self.token.read().await;
            if let Some(ref t) = *token {
                if t.expires_at > chrono::Utc::now() + chrono::Duration::seconds(30) {
                    return Ok(t.access_token.clone());
                }
            }
        }

        // Fetch a new token using the password grant against the master realm
        let token_url = format!(
            "{}/realms/master/protocol/openid-connect/token",
            self.config.url
        );

        let mut params = vec![
            ("grant_type", "password"),
            ("client_id", &self.config.admin_client_id),
            ("username", &self.config.admin_username),
            ("password", &self.config.admin_password),
        ];

        // client_secret is only needed for confidential admin clients
        if !self.config.admin_client_secret.is_empty() {
            params.push(("client_secret", &self.config.admin_client_secret));
        }

        let response = self
            .http_client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                AppError::backend_unreachable(format!("Failed to get admin token: {}", e))
            })?;

        // Token failures are a deployment problem, not something the caller
        // can act on, so they never mirror the remote status
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::backend_unreachable(format!(
                "Failed to get admin token: {} - {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: i64,
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            AppError::backend_unreachable(format!("Failed to parse token response: {}", e))
        })?;

        let admin_token = AdminToken {
            access_token: token_response.access_token.clone(),
            expires_at: chrono::Utc::now() + chrono::Duration::seconds(token_response.expires_in),
        };

        // Cache the token
        {
            let mut token = self.token.write().await;
            *token = Some(admin_token);
        }

        debug!(
            "Refreshed Keycloak admin token, expires in {}s",
            token_response.expires_in
        );

        Ok(token_response.access_token)
    }

    /// Realm-level role mappings for a user
    async fn fetch_realm_roles(&self, user_id: Uuid) -> Result<Vec<RoleRepresentation>> {
        let token = self.get_admin_token().await?;
        let url = format!(
            "{}/admin/realms/{}/users/{}/role-mappings",
            self.config.url, self.config.realm, user_id
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| {
                AppError::backend_unreachable(format!("Failed to fetch role mappings: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(backend_failure("Failed to fetch role mappings", response).await);
        }

        let mappings: RoleMappings = response.json().await.map_err(|e| {
            AppError::backend_unreachable(format!("Failed to parse role mappings: {}", e))
        })?;

        Ok(mappings.realm_mappings)
    }

    /// Group memberships for a user
    async fn fetch_group_memberships(&self, user_id: Uuid) -> Result<Vec<GroupRepresentation>> {
        let token = self.get_admin_token().await?;
        let url = format!(
            "{}/admin/realms/{}/users/{}/groups",
            self.config.url, self.config.realm, user_id
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::backend_unreachable(format!("Failed to fetch groups: {}", e)))?;

        if !response.status().is_success() {
            return Err(backend_failure("Failed to fetch groups", response).await);
        }

        let groups: Vec<GroupRepresentation> = response
            .json()
            .await
            .map_err(|e| AppError::backend_unreachable(format!("Failed to parse groups: {}", e)))?;

        Ok(groups)
    }
}

#[async_trait]
impl IdentityGateway for KeycloakClient {
    async fn create_user(&self, user: &UserRepresentation) -> Result<String> {
        let token = self.get_admin_token().await?;
        let url = format!(
            "{}/admin/realms/{}/users",
            self.config.url, self.config.realm
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(user)
            .send()
            .await
            .map_err(|e| AppError::backend_unreachable(format!("Failed to create user: {}", e)))?;

        if !response.status().is_success() {
            return Err(backend_failure("Failed to create user", response).await);
        }

        // Keycloak returns the new user's id only via the Location header
        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::backend_unreachable("Missing location header"))?;

        let user_id = location
            .split('/')
            .next_back()
            .ok_or_else(|| AppError::backend_unreachable("Invalid location header"))?;

        Ok(user_id.to_string())
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<UserRepresentation> {
        let token = self.get_admin_token().await?;
        let url = format!(
            "{}/admin/realms/{}/users/{}",
            self.config.url, self.config.realm, user_id
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AppError::backend_unreachable(format!("Failed to fetch user: {}", e)))?;

        // Not-found passes through like any other backend status
        if !response.status().is_success() {
            return Err(backend_failure("Failed to fetch user", response).await);
        }

        let user: UserRepresentation = response
            .json()
            .await
            .map_err(|e| AppError::backend_unreachable(format!("Failed to parse user: {}", e)))?;

        Ok(user)
    }

    async fn fetch_roles_and_groups(
        &self,
        user_id: Uuid,
    ) -> Result<(Vec<RoleRepresentation>, Vec<GroupRepresentation>)> {
        let roles = self.fetch_realm_roles(user_id).await?;
        let groups = self.fetch_group_memberships(user_id).await?;
        Ok((roles, groups))
    }
}

/// Turn a non-2xx Admin API response into an error mirroring its status.
///
/// Keycloak error bodies usually look like `{"errorMessage": "..."}`; the
/// message is lifted out when present, otherwise the raw body (or the given
/// context for empty bodies) is used.
async fn backend_failure(context: &str, response: Response) -> AppError {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct KeycloakErrorBody {
        error_message: Option<String>,
        error: Option<String>,
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<KeycloakErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error_message.or(parsed.error))
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("{}: {}", context, status)
            } else {
                body
            }
        });

    AppError::backend(status, message)
}
