//! User business logic

use crate::domain::{UserCreationRequest, UserProfile};
use crate::error::Result;
use crate::keycloak::{CredentialRepresentation, IdentityGateway, UserRepresentation};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct UserService<G: IdentityGateway> {
    gateway: Arc<G>,
}

impl<G: IdentityGateway> UserService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Validate and create a user in the realm.
    ///
    /// A validation failure carries every violated field and nothing is
    /// sent to the backend in that case. Created users are enabled and get
    /// a permanent password credential.
    pub async fn create_user(&self, request: UserCreationRequest) -> Result<()> {
        request.validate()?;

        let user = UserRepresentation {
            id: None,
            username: request.username,
            email: Some(request.email),
            first_name: Some(request.first_name),
            last_name: Some(request.last_name),
            enabled: true,
            credentials: vec![CredentialRepresentation {
                credential_type: "password".to_string(),
                value: request.password,
                temporary: false,
            }],
        };

        let user_id = self.gateway.create_user(&user).await?;
        info!(%user_id, username = %user.username, "Created user");

        Ok(())
    }

    /// Assemble the composite profile for one user.
    ///
    /// The profile read happens first, then the role and group reads; any
    /// failure aborts the whole aggregation. Role and group names keep the
    /// order the backend returned them in.
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<UserProfile> {
        let profile = self.gateway.fetch_profile(user_id).await?;
        let (roles, groups) = self.gateway.fetch_roles_and_groups(user_id).await?;

        Ok(UserProfile {
            id: user_id,
            first_name: profile.first_name.unwrap_or_default(),
            last_name: profile.last_name.unwrap_or_default(),
            email: profile.email.unwrap_or_default(),
            roles: roles.into_iter().map(|r| r.name).collect(),
            groups: groups.into_iter().map(|g| g.name).collect(),
        })
    }
}
