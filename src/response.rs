//! The uniform JSON envelope used by every API response.

use serde::{Deserialize, Serialize};

/// The body of every API response.
///
/// `message` carries a human-readable outcome description, `data` the
/// endpoint-specific payload, and `errors` field-level validation messages.
/// Absent fields are omitted from the serialized JSON.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// A human-readable description of the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The endpoint-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Field-level validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying only `data`.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    /// A successful response carrying a message and `data`.
    pub fn with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// A successful response carrying only a message.
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
            errors: None,
        }
    }

    /// A failed response carrying only a message.
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            data: None,
            errors: None,
        }
    }

    /// A failed response carrying a message and field-level errors.
    pub fn failure_with_errors(message: &str, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            data: None,
            errors: Some(errors),
        }
    }
}
