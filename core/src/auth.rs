//! Request builder and response normalizer for the `/identity` endpoints.
//!
//! Login and registration are unauthenticated; token validation carries the
//! bearer token like every resource call.

use serde_json::Value;

use crate::client::{body_message, check_status, json_request, parse_optional_json, require_token};
use crate::error::ApiError;
use crate::http::{bearer, header, HttpMethod, HttpRequest, HttpResponse, ACCEPT_JSON};
use crate::types::{Credentials, LoginResponse};

/// A successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub message: String,
    pub token: String,
}

/// A successful token validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub message: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        json_request(
            HttpMethod::Post,
            format!("{}/identity/login", self.base_url),
            None,
            &credentials(email, password),
        )
    }

    pub fn build_register(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        json_request(
            HttpMethod::Post,
            format!("{}/identity/register", self.base_url),
            None,
            &credentials(email, password),
        )
    }

    pub fn build_validate(&self, token: Option<&str>) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/identity/validate-token", self.base_url),
            headers: vec![header(ACCEPT_JSON), bearer(token)],
            body: None,
        })
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginOutcome, ApiError> {
        let value = parse_optional_json(&response.body).map_err(|detail| ApiError::Parse {
            context: "Login failed: Invalid JSON response from server".to_string(),
            detail,
        })?;
        if !response.is_success() {
            return Err(ApiError::Server {
                status: response.status,
                message: value
                    .as_ref()
                    .and_then(message_or_error)
                    .unwrap_or_else(|| "Login failed. Please check credentials.".to_string()),
            });
        }
        let body: LoginResponse = value
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ApiError::Parse {
                context: "Login failed: Invalid JSON response from server".to_string(),
                detail: e.to_string(),
            })?
            .unwrap_or_default();
        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Server {
                status: response.status,
                message: "Login failed: response did not include an access token.".to_string(),
            })?;
        Ok(LoginOutcome {
            message: body.message.unwrap_or_else(|| "Login successful!".to_string()),
            token,
        })
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<String, ApiError> {
        let value = parse_optional_json(&response.body).map_err(|detail| ApiError::Parse {
            context: "Registration failed: Invalid JSON response from server".to_string(),
            detail,
        })?;
        let message = value.as_ref().and_then(message_or_error);
        if response.is_success() {
            Ok(message.unwrap_or_else(|| "Registration successful!".to_string()))
        } else {
            Err(ApiError::Server {
                status: response.status,
                message: message.unwrap_or_else(|| "Registration failed.".to_string()),
            })
        }
    }

    pub fn parse_validate(&self, response: HttpResponse) -> Result<ValidationOutcome, ApiError> {
        let status = response.status;
        check_status(&response, || format!("Token validation failed with status: {status}."))?;
        if response.body.is_empty() {
            return Ok(ValidationOutcome {
                message: Some("Token validated successfully (empty response).".to_string()),
                data: None,
            });
        }
        let data: Value = serde_json::from_str(&response.body).map_err(|e| ApiError::Parse {
            context: "Token validation succeeded but response was not valid JSON".to_string(),
            detail: e.to_string(),
        })?;
        Ok(ValidationOutcome {
            message: None,
            data: Some(data),
        })
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn message_or_error(value: &Value) -> Option<String> {
    body_message(value).or_else(|| {
        value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
