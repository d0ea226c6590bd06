//! Unified error handling for userdesk

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::borrow::Cow;
use std::collections::BTreeMap;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// `Validation` and `Forbidden` originate locally; `Backend` mirrors whatever
/// status the IAM system produced (500 when the failure has no remote status,
/// e.g. the connection itself failed).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    #[error("{message}")]
    Backend { status: StatusCode, message: String },

    #[error("Forbidden")]
    Forbidden,
}

impl AppError {
    /// Backend failure with the remote's status mirrored through
    pub fn backend(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Backend {
            status,
            message: message.into(),
        }
    }

    /// Backend failure with no usable remote status
    pub fn backend_unreachable(message: impl Into<String>) -> Self {
        AppError::Backend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Full field->message map as the body, all violations at once
            AppError::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(fields)).into_response()
            }
            AppError::Backend { status, message } => {
                if status.is_server_error() {
                    tracing::error!(%status, "Backend operation failed: {}", message);
                }
                (status, message).into_response()
            }
            AppError::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

// Conversion from validation errors: one message per field, keyed the way the
// wire names the field (camelCase). The derive records built-in violations
// (length, regex) ahead of custom ones, so the blank check is selected by its
// code rather than by position.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, violations)| {
                let message = violations
                    .iter()
                    .find(|v| v.code == "not_blank")
                    .or_else(|| violations.first())
                    .and_then(|v| v.message.clone())
                    .unwrap_or(Cow::Borrowed("invalid value"));
                (camel_case(&field), message.into_owned())
            })
            .collect();
        AppError::Validation(fields)
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
