//! Keycloak Admin API wire types
//!
//! Shapes exchanged with the Keycloak Admin REST API. Only the fields the
//! gateway actually reads or writes are modelled; everything else in the
//! responses is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Keycloak user representation
///
/// Serialized when creating a user, deserialized when reading one back.
/// Keycloak never returns credentials on reads, so the field stays empty
/// in that direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRepresentation>,
}

/// Credential attached to a user creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub value: String,
    pub temporary: bool,
}

/// Keycloak realm role representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Keycloak group representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Envelope returned by the user role-mappings endpoint.
///
/// Keycloak omits `realmMappings` entirely for users without realm roles,
/// so the field defaults to an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMappings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm_mappings: Vec<RoleRepresentation>,
}
