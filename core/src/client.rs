//! Stateless HTTP request builder and response normalizer for one resource.
//!
//! # Design
//! `ResourceClient` holds only a `base_url` and the `Resource` it talks to.
//! Each CRUD operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the client
//! deterministic and free of I/O dependencies.
//!
//! Missing tokens and ids are rejected at build time so no request is ever
//! produced for them. An empty 2xx body is a failure for reads but a
//! success for writes.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{bearer, header, HttpMethod, HttpRequest, HttpResponse, ACCEPT_JSON, CONTENT_TYPE_JSON};
use crate::resource::Resource;
use crate::types::Record;

/// Outcome of a successful create, update or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub message: String,
    pub record: Option<Record>,
}

/// Synchronous, stateless client for one `/api/<resource>` family.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: String,
    resource: Resource,
}

impl ResourceClient {
    pub fn new(base_url: &str, resource: Resource) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.base_url, self.resource.segment())
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/api/{}/{id}", self.base_url, self.resource.segment())
    }

    fn require_id(&self, id: i64) -> Result<i64, ApiError> {
        if id == 0 {
            return Err(ApiError::MissingId {
                resource: self.resource.singular(),
            });
        }
        Ok(id)
    }

    pub fn build_list(&self, token: Option<&str>) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        Ok(read_request(HttpMethod::Get, self.collection_url(), token))
    }

    pub fn build_get(&self, token: Option<&str>, id: i64) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        let id = self.require_id(id)?;
        Ok(read_request(HttpMethod::Get, self.item_url(id), token))
    }

    pub fn build_create(&self, token: Option<&str>, payload: &Record) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        json_request(HttpMethod::Post, self.collection_url(), Some(token), payload)
    }

    /// PUT of an already merged record; see `CrmApi::update` for the merge.
    pub fn build_update(&self, token: Option<&str>, id: i64, merged: &Record) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        let id = self.require_id(id)?;
        json_request(HttpMethod::Put, self.item_url(id), Some(token), merged)
    }

    pub fn build_delete(&self, token: Option<&str>, id: i64) -> Result<HttpRequest, ApiError> {
        let token = require_token(token)?;
        let id = self.require_id(id)?;
        Ok(read_request(HttpMethod::Delete, self.item_url(id), token))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        let plural = self.resource.plural();
        let body = read_body(
            response,
            || format!("Failed to fetch {plural}"),
            |status| format!("Failed to fetch {plural}. Status: {status}."),
        )?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse {
            context: format!("Failed to parse {plural} data"),
            detail: e.to_string(),
        })
    }

    pub fn parse_get(&self, id: i64, response: HttpResponse) -> Result<Record, ApiError> {
        let singular = self.resource.singular();
        let body = read_body(
            response,
            || format!("Failed to fetch {singular}"),
            |status| format!("Failed to fetch {singular} with ID {id}. Status: {status}."),
        )?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse {
            context: format!("Failed to parse {singular} data"),
            detail: e.to_string(),
        })
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<WriteOutcome, ApiError> {
        let title = self.resource.title();
        let singular = self.resource.singular();
        if response.status == 204 {
            return Ok(WriteOutcome {
                message: format!("{title} created successfully (no content returned)."),
                record: None,
            });
        }
        check_status(&response, || format!("Failed to create {singular}. Status: {}.", response.status))?;
        let value = parse_optional_json(&response.body).map_err(|detail| ApiError::Parse {
            context: format!("Failed to create {singular}: Invalid JSON response from server"),
            detail,
        })?;
        Ok(written(value, format!("{title} created successfully!")))
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<WriteOutcome, ApiError> {
        let title = self.resource.title();
        let singular = self.resource.singular();
        if response.status == 204 {
            return Ok(WriteOutcome {
                message: format!("{title} updated successfully (no content returned)."),
                record: None,
            });
        }
        check_status(&response, || format!("Failed to update {singular}. Status: {}.", response.status))?;
        let value = parse_optional_json(&response.body).map_err(|detail| ApiError::Parse {
            context: format!("{title} updated but response was not valid JSON"),
            detail,
        })?;
        Ok(written(value, format!("{title} updated successfully!")))
    }

    /// Any 2xx is a success; an unparseable body only loses its message.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<WriteOutcome, ApiError> {
        let title = self.resource.title();
        let singular = self.resource.singular();
        if response.status == 204 {
            return Ok(WriteOutcome {
                message: format!("{title} deleted successfully (no content returned)."),
                record: None,
            });
        }
        check_status(&response, || format!("Failed to delete {singular}. Status: {}.", response.status))?;
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|v| body_message(&v))
            .unwrap_or_else(|| format!("{title} deleted successfully!"));
        Ok(WriteOutcome { message, record: None })
    }
}

pub(crate) fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    match token {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(ApiError::MissingToken),
    }
}

fn read_request(method: HttpMethod, url: String, token: &str) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: vec![header(ACCEPT_JSON), bearer(token)],
        body: None,
    }
}

pub(crate) fn json_request<B: serde::Serialize>(
    method: HttpMethod,
    url: String,
    token: Option<&str>,
    body: &B,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
    let mut headers = vec![header(ACCEPT_JSON), header(CONTENT_TYPE_JSON)];
    if let Some(token) = token {
        headers.push(bearer(token));
    }
    Ok(HttpRequest {
        method,
        url,
        headers,
        body: Some(body),
    })
}

/// Map a non-2xx response to `ApiError::Server` with the best message the
/// body offers.
pub(crate) fn check_status(response: &HttpResponse, fallback: impl FnOnce() -> String) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Server {
        status: response.status,
        message: extract_error_message(&response.body).unwrap_or_else(fallback),
    })
}

/// Body of a read: non-2xx becomes `Server`, an empty 2xx becomes
/// `EmptyResponse`.
fn read_body(
    response: HttpResponse,
    empty_context: impl FnOnce() -> String,
    fallback: impl FnOnce(u16) -> String,
) -> Result<String, ApiError> {
    let status = response.status;
    check_status(&response, || fallback(status))?;
    if response.body.is_empty() {
        return Err(ApiError::EmptyResponse {
            context: empty_context(),
        });
    }
    Ok(response.body)
}

/// `message`, then `error`, from a JSON error body; otherwise the raw text.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => body_message(&value)
            .or_else(|| error_field(&value))
            .or_else(|| Some(body.to_string())),
        Err(_) => Some(body.to_string()),
    }
}

pub(crate) fn body_message(value: &Value) -> Option<String> {
    non_empty_str(value.get("message")?)
}

fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Object(obj) => obj.get("message").and_then(non_empty_str),
        other => non_empty_str(other),
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.trim().is_empty()).map(str::to_string)
}

/// Parse a body that may legitimately be empty.
pub(crate) fn parse_optional_json(body: &str) -> Result<Option<Value>, String> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body).map(Some).map_err(|e| e.to_string())
}

fn written(value: Option<Value>, default_message: String) -> WriteOutcome {
    let message = value
        .as_ref()
        .and_then(body_message)
        .unwrap_or(default_message);
    let record = value.and_then(|v| Record::try_from(v).ok());
    WriteOutcome { message, record }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ResourceClient {
        ResourceClient::new("http://localhost:3000", Resource::Customer)
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse::new(200, body)
    }

    #[test]
    fn build_list_produces_authenticated_get() {
        let req = client().build_list(Some("tok")).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/customer");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_without_token_is_rejected() {
        let c = client();
        assert_eq!(c.build_list(None).unwrap_err(), ApiError::MissingToken);
        assert_eq!(c.build_list(Some("")).unwrap_err(), ApiError::MissingToken);
        assert_eq!(c.build_get(None, 1).unwrap_err(), ApiError::MissingToken);
        assert_eq!(c.build_create(None, &Record::new()).unwrap_err(), ApiError::MissingToken);
        assert_eq!(c.build_update(None, 1, &Record::new()).unwrap_err(), ApiError::MissingToken);
        assert_eq!(c.build_delete(None, 1).unwrap_err(), ApiError::MissingToken);
    }

    #[test]
    fn build_get_with_zero_id_is_rejected() {
        let err = client().build_get(Some("tok"), 0).unwrap_err();
        assert_eq!(err.to_string(), "No customer ID provided.");
    }

    #[test]
    fn build_create_sends_json_body() {
        let payload = Record::new().with("name", "Acme");
        let req = client().build_create(Some("tok"), &payload).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Acme"}));
    }

    #[test]
    fn build_update_and_delete_target_item_url() {
        let c = client();
        let put = c.build_update(Some("tok"), 42, &Record::new()).unwrap();
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.url, "http://localhost:3000/api/customer/42");
        let del = c.build_delete(Some("tok"), 42).unwrap();
        assert_eq!(del.method, HttpMethod::Delete);
        assert_eq!(del.url, "http://localhost:3000/api/customer/42");
        assert!(del.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = ResourceClient::new("http://localhost:3000/", Resource::TodoTask);
        assert_eq!(c.build_list(Some("t")).unwrap().url, "http://localhost:3000/api/todotask");
    }

    #[test]
    fn parse_list_empty_array_is_success() {
        assert!(client().parse_list(ok("[]")).unwrap().is_empty());
    }

    #[test]
    fn parse_list_empty_body_is_failure() {
        let err = client().parse_list(ok("")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch customers: Empty response.");
    }

    #[test]
    fn parse_get_empty_body_is_failure() {
        let err = client().parse_get(3, ok("")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch customer: Empty response.");
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Parse { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse customers data: Parse Error:"), "{message}");
    }

    #[test]
    fn parse_list_server_error_prefers_message_field() {
        let resp = HttpResponse::new(500, r#"{"message":"db down","error":"ignored"}"#);
        assert_eq!(client().parse_list(resp).unwrap_err().to_string(), "db down");
    }

    #[test]
    fn parse_list_server_error_falls_back_to_error_field() {
        let resp = HttpResponse::new(403, r#"{"error":"forbidden"}"#);
        assert_eq!(client().parse_list(resp).unwrap_err().to_string(), "forbidden");
        let nested = HttpResponse::new(422, r#"{"error":{"code":"x","message":"bad field"}}"#);
        assert_eq!(client().parse_list(nested).unwrap_err().to_string(), "bad field");
    }

    #[test]
    fn parse_list_server_error_falls_back_to_raw_text() {
        let resp = HttpResponse::new(502, "upstream unavailable");
        assert_eq!(client().parse_list(resp).unwrap_err().to_string(), "upstream unavailable");
    }

    #[test]
    fn parse_list_server_error_generic_when_body_empty() {
        let err = client().parse_list(HttpResponse::new(500, "")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch customers. Status: 500.");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn parse_get_generic_status_message_names_id() {
        let err = client().parse_get(9, HttpResponse::new(404, "")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch customer with ID 9. Status: 404.");
    }

    #[test]
    fn parse_create_204_is_success_without_data() {
        let out = client().parse_create(HttpResponse::new(204, "")).unwrap();
        assert_eq!(out.message, "Customer created successfully (no content returned).");
        assert!(out.record.is_none());
    }

    #[test]
    fn parse_create_returns_record_and_default_message() {
        let out = client().parse_create(HttpResponse::new(201, r#"{"id":1,"name":"Acme"}"#)).unwrap();
        assert_eq!(out.message, "Customer created successfully!");
        assert_eq!(out.record.unwrap().id(), Some(1));
    }

    #[test]
    fn parse_create_empty_2xx_is_success() {
        let out = client().parse_create(ok("")).unwrap();
        assert!(out.record.is_none());
    }

    #[test]
    fn parse_create_bad_json_is_parse_error() {
        let err = client().parse_create(ok("{oops")).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to create customer: Invalid JSON response from server"));
        assert!(message.contains("Parse Error"));
    }

    #[test]
    fn parse_create_failure_uses_generic_status_message() {
        let err = client().parse_create(HttpResponse::new(400, "")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to create customer. Status: 400.");
    }

    #[test]
    fn parse_update_message_from_body() {
        let out = client().parse_update(ok(r#"{"message":"saved"}"#)).unwrap();
        assert_eq!(out.message, "saved");
    }

    #[test]
    fn parse_update_bad_json() {
        let err = client().parse_update(ok("<html>")).unwrap_err();
        assert!(err.to_string().starts_with("Customer updated but response was not valid JSON: Parse Error:"));
    }

    #[test]
    fn parse_delete_accepts_any_2xx_body() {
        let c = client();
        assert_eq!(
            c.parse_delete(HttpResponse::new(204, "")).unwrap().message,
            "Customer deleted successfully (no content returned)."
        );
        assert_eq!(c.parse_delete(ok("")).unwrap().message, "Customer deleted successfully!");
        assert_eq!(c.parse_delete(ok("<<garbage")).unwrap().message, "Customer deleted successfully!");
        assert_eq!(c.parse_delete(ok(r#"{"message":"gone"}"#)).unwrap().message, "gone");
    }

    #[test]
    fn parse_delete_not_found() {
        let err = client()
            .parse_delete(HttpResponse::new(404, r#"{"message":"customer 5 not found"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "customer 5 not found");
        assert_eq!(err.status(), Some(404));
    }
}
