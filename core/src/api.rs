//! Envelope-returning facade over the resource and identity clients.
//!
//! # Design
//! `CrmApi` pairs a base URL with a host `Transport` and runs the
//! build → execute → parse cycle for each operation. Every method returns an
//! `ApiResult`; errors from any stage are folded into a failed envelope, so
//! nothing a caller does here can panic or propagate `Err`.
//!
//! The bearer token is an explicit argument on every call. The facade keeps
//! no session state.

use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthClient, ValidationOutcome};
use crate::client::{require_token, ResourceClient, WriteOutcome};
use crate::envelope::ApiResult;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::resource::Resource;
use crate::transport::Transport;
use crate::types::{merge_for_update, Record};

#[derive(Debug, Clone)]
pub struct CrmApi<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> CrmApi<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn client(&self, resource: Resource) -> ResourceClient {
        ResourceClient::new(&self.base_url, resource)
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    pub fn list(&self, token: Option<&str>, resource: Resource) -> ApiResult<Vec<Record>> {
        let client = self.client(resource);
        let result = client
            .build_list(token)
            .and_then(|req| self.execute(req))
            .and_then(|resp| client.parse_list(resp));
        finish(resource, "list", result)
    }

    pub fn get_by_id(&self, token: Option<&str>, resource: Resource, id: i64) -> ApiResult<Record> {
        finish(resource, "get", self.fetch_one(token, resource, id))
    }

    fn fetch_one(&self, token: Option<&str>, resource: Resource, id: i64) -> Result<Record, ApiError> {
        let client = self.client(resource);
        let req = client.build_get(token, id)?;
        client.parse_get(id, self.execute(req)?)
    }

    pub fn create(&self, token: Option<&str>, resource: Resource, payload: &Record) -> ApiResult<Record> {
        let client = self.client(resource);
        let result = client
            .build_create(token, payload)
            .and_then(|req| self.execute(req))
            .and_then(|resp| client.parse_create(resp));
        finish_write(resource, "create", result)
    }

    /// Merge-before-write: GET the current record, overlay `partial`, force
    /// `id`, then PUT the whole object. A failed GET returns before any write.
    pub fn update(&self, token: Option<&str>, resource: Resource, id: i64, partial: &Record) -> ApiResult<Record> {
        let client = self.client(resource);
        let result = require_token(token).and_then(|_| {
            let existing = self.fetch_one(token, resource, id).map_err(|source| ApiError::ExistingFetch {
                resource: resource.singular(),
                source: Box::new(source),
            })?;
            let merged = merge_for_update(existing, partial, id);
            let req = client.build_update(token, id, &merged)?;
            client.parse_update(self.execute(req)?)
        });
        finish_write(resource, "update", result)
    }

    pub fn delete(&self, token: Option<&str>, resource: Resource, id: i64) -> ApiResult<()> {
        let client = self.client(resource);
        let result = client
            .build_delete(token, id)
            .and_then(|req| self.execute(req))
            .and_then(|resp| client.parse_delete(resp));
        match result {
            Ok(outcome) => ApiResult::ok_with_message(outcome.message, Some(())),
            Err(err) => failed(resource, "delete", err),
        }
    }

    /// On success `data` is the access token.
    pub fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let auth = AuthClient::new(&self.base_url);
        let result = auth
            .build_login(email, password)
            .and_then(|req| self.execute(req))
            .and_then(|resp| auth.parse_login(resp));
        match result {
            Ok(outcome) => ApiResult::ok_with_message(outcome.message, Some(outcome.token)),
            Err(ApiError::Network(_)) => ApiResult::fail(
                "Network error. Could not connect to the login server. Ensure it is running and accessible.",
            ),
            Err(err) => auth_failed("login", err),
        }
    }

    pub fn register(&self, email: &str, password: &str) -> ApiResult<()> {
        let auth = AuthClient::new(&self.base_url);
        let result = auth
            .build_register(email, password)
            .and_then(|req| self.execute(req))
            .and_then(|resp| auth.parse_register(resp));
        match result {
            Ok(message) => ApiResult::ok_with_message(message, Some(())),
            Err(ApiError::Network(_)) => ApiResult::fail(
                "Network error. Could not connect to the registration server. Ensure it is running and accessible.",
            ),
            Err(err) => auth_failed("register", err),
        }
    }

    pub fn validate_token(&self, token: Option<&str>) -> ApiResult<Value> {
        match self.check_token(token) {
            Ok(outcome) => ApiResult {
                success: true,
                message: outcome.message,
                data: outcome.data,
            },
            Err(ApiError::MissingToken) => ApiResult::fail("No token provided for validation."),
            Err(err) => auth_failed("validate-token", err),
        }
    }

    /// `validate_token` without the envelope, so a host can tell a token the
    /// server rejected (`ApiError::Server`) from a server it never reached.
    pub fn check_token(&self, token: Option<&str>) -> Result<ValidationOutcome, ApiError> {
        let auth = AuthClient::new(&self.base_url);
        let req = auth.build_validate(token)?;
        auth.parse_validate(self.execute(req)?)
    }
}

fn finish<D>(resource: Resource, op: &str, result: Result<D, ApiError>) -> ApiResult<D> {
    match result {
        Ok(data) => ApiResult::ok(data),
        Err(err) => failed(resource, op, err),
    }
}

fn finish_write(
    resource: Resource,
    op: &str,
    result: Result<WriteOutcome, ApiError>,
) -> ApiResult<Record> {
    match result {
        Ok(outcome) => ApiResult::ok_with_message(outcome.message, outcome.record),
        Err(err) => failed(resource, op, err),
    }
}

fn failed<D>(resource: Resource, op: &str, err: ApiError) -> ApiResult<D> {
    warn!(resource = %resource, op, status = ?err.status(), error = %err, "operation failed");
    ApiResult::from_error(err)
}

fn auth_failed<D>(op: &str, err: ApiError) -> ApiResult<D> {
    warn!(op, status = ?err.status(), error = %err, "identity call failed");
    ApiResult::from_error(err)
}
