//! Error types for the CRM API client.
//!
//! # Design
//! Every variant renders, through `Display`, as the human-readable message
//! that ends up in a failed `ApiResult`. The page layer never matches on
//! the variant; it only shows the message. Hosts and tests may still match
//! to tell a missing token apart from a server rejection.

use thiserror::Error;

/// Failures produced while building requests or normalizing responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No bearer token was supplied; no request was attempted.
    #[error("No authentication token provided.")]
    MissingToken,

    /// The record id was zero; no request was attempted.
    #[error("No {resource} ID provided.")]
    MissingId { resource: &'static str },

    /// A response body was not the JSON the operation expected.
    #[error("{context}: Parse Error: {detail}")]
    Parse { context: String, detail: String },

    /// A read endpoint answered 2xx with an empty body.
    #[error("{context}: Empty response.")]
    EmptyResponse { context: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Step one of merge-before-write failed; no write was issued.
    #[error("Failed to fetch existing {resource} for update: {source}")]
    ExistingFetch {
        resource: &'static str,
        source: Box<ApiError>,
    },

    /// The request payload could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status behind the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::ExistingFetch { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// A host transport could not complete the round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        let detail = if err.0.trim().is_empty() {
            "Could not connect to the server.".to_string()
        } else {
            err.0
        };
        ApiError::Network(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_fetch_wraps_inner_message() {
        let err = ApiError::ExistingFetch {
            resource: "customer",
            source: Box::new(ApiError::Server {
                status: 404,
                message: "customer 42 not found".to_string(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch existing customer for update: customer 42 not found"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn empty_transport_detail_gets_fallback() {
        let err: ApiError = TransportError(String::new()).into();
        assert_eq!(err.to_string(), "Network error: Could not connect to the server.");
    }

    #[test]
    fn parse_error_message_mentions_parse_error() {
        let err = ApiError::Parse {
            context: "Failed to parse customers data".to_string(),
            detail: "expected value at line 1 column 1".to_string(),
        };
        assert!(err.to_string().contains("Parse Error"));
    }
}
