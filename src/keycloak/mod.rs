//! Keycloak integration: Admin API wire types and the gateway client

pub mod client;
pub mod types;

pub use client::{IdentityGateway, KeycloakClient};
pub use types::*;
