//! Domain models for userdesk

pub mod user;

pub use user::*;
