//! Userdesk - Moderator User Management API
//!
//! This crate provides the core functionality for the Userdesk service,
//! including the REST API, JWT verification, and integration with Keycloak.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod keycloak;
pub mod middleware;
pub mod policy;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
