//! The uniform `{ success, message, data }` result shape.
//!
//! # Design
//! `CrmApi` never returns `Err`; every outcome is folded into an
//! `ApiResult`. A failed result always carries a non-empty message, a
//! successful read always carries data.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "An unknown error occurred.".to_string()
        } else {
            message
        };
        Self {
            success: false,
            message: Some(message),
            data: None,
        }
    }

    pub fn from_error(err: ApiError) -> Self {
        Self::fail(err.to_string())
    }

    /// Message text, or an empty string when none was set.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}
