//! User domain model
//!
//! `UserCreationRequest` carries the inbound payload for user creation and
//! owns all field constraints; `UserProfile` is the composite view assembled
//! from the profile, role and group lookups. Neither is persisted locally.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

lazy_static::lazy_static! {
    /// Permissive "something@something.something" shape
    static ref EMAIL_SHAPE: regex::Regex = regex::Regex::new(r"^.+@.+\..+$").unwrap();
}

/// Inbound payload for creating a user in the realm.
///
/// Validation collects every violated field in one pass; when several rules
/// on one field fail at once, the blank check is the one reported (the error
/// conversion prefers it over length and format violations).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserCreationRequest {
    #[validate(
        custom(function = "not_blank", message = "Username should not be blank"),
        length(
            min = 2,
            max = 30,
            message = "Username should be between 2 and 30 characters long"
        )
    )]
    pub username: String,

    #[validate(
        custom(function = "not_blank", message = "Email should not be blank"),
        regex(path = *EMAIL_SHAPE, message = "Email should be valid")
    )]
    pub email: String,

    #[validate(
        custom(function = "not_blank", message = "Password should not be blank"),
        length(
            min = 4,
            message = "Password should be greater than 4 characters long"
        )
    )]
    pub password: String,

    #[validate(custom(function = "not_blank"))]
    pub first_name: String,

    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
}

/// Composite user view: profile fields plus realm role names and group names,
/// in the order the IAM system returned them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub groups: Vec<String>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        Err(validator::ValidationError::new("not_blank")
            .with_message("must not be blank".into()))
    } else {
        Ok(())
    }
}
