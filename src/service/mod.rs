//! Business logic layer

pub mod user;

pub use user::UserService;
