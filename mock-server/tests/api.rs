use axum::http::{self, Request, StatusCode};
use axum::response::Response;
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_server::{app, app_with, Store};
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

const TOKEN: &str = "test-token";

fn seeded() -> axum::Router {
    app_with(Store::default().with_token("user@example.com", TOKEN))
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Drive a long-lived service so state carries across requests.
async fn send(app: &mut RouterIntoService<String>, request: Request<String>) -> Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

fn authed(method: &str, uri: &str, body: Option<&str>) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(http::header::ACCEPT, "application/json");
    if body.is_some() {
        builder = builder.header(http::header::CONTENT_TYPE, "application/json");
    }
    builder.body(body.unwrap_or_default().to_string()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn list_without_token_is_unauthorized() {
    let resp = seeded()
        .oneshot(Request::builder().uri("/api/customer").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let resp = app()
        .oneshot(authed("GET", "/api/customer", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_login_issues_usable_token() {
    let mut app = app().into_service();
    let creds = r#"{"email":"new@example.com","password":"secret"}"#;

    let resp = send(&mut app, json_request("POST", "/identity/register", creds)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, json_request("POST", "/identity/register", creds)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&mut app, json_request("POST", "/identity/login", creds)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let token = body["accessToken"].as_str().unwrap().to_string();

    let validate = Request::builder()
        .uri("/identity/validate-token")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap();
    let resp = send(&mut app, validate).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["email"], "new@example.com");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = app_with(Store::default().with_user("a@example.com", "right"));
    let resp = app
        .oneshot(json_request(
            "POST",
            "/identity/login",
            r#"{"email":"a@example.com","password":"wrong"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Invalid email or password.");
}

// --- list ---

#[tokio::test]
async fn list_empty_resource_returns_empty_array() {
    let resp = seeded()
        .oneshot(authed("GET", "/api/lead", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn unknown_resource_returns_404_with_error_field() {
    let resp = seeded()
        .oneshot(authed("GET", "/api/widget", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "unknown resource 'widget'");
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_assigned_id() {
    let resp = seeded()
        .oneshot(authed("POST", "/api/customer", Some(r#"{"name":"Acme","id":500}"#)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"id": 1, "name": "Acme"}));
}

#[tokio::test]
async fn create_non_object_returns_400() {
    let resp = seeded()
        .oneshot(authed("POST", "/api/customer", Some("[1,2]")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get / update / delete ---

#[tokio::test]
async fn get_missing_record_returns_message() {
    let resp = seeded()
        .oneshot(authed("GET", "/api/product/42", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "product 42 not found");
}

#[tokio::test]
async fn get_non_numeric_id_returns_400() {
    let resp = seeded()
        .oneshot(authed("GET", "/api/product/abc", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_missing_record_returns_404() {
    let resp = seeded()
        .oneshot(authed("PUT", "/api/sale/9", Some(r#"{"notes":"x"}"#)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_record_returns_404() {
    let resp = seeded()
        .oneshot(authed("DELETE", "/api/vendor/9", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = seeded().into_service();

    // create
    let create = authed("POST", "/api/customer", Some(r#"{"name":"Acme","industry":"Retail"}"#));
    let resp = send(&mut app, create).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    // list contains the one customer
    let resp = send(&mut app, authed("GET", "/api/customer", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let customers: Vec<Value> = body_json(resp).await;
    assert_eq!(customers, vec![created.clone()]);

    // put replaces the whole record; fields not sent are gone
    let put = authed("PUT", &format!("/api/customer/{id}"), Some(r#"{"name":"Acme Ltd","id":999}"#));
    let resp = send(&mut app, put).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&mut app, authed("GET", &format!("/api/customer/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, json!({"id": id, "name": "Acme Ltd"}));

    // delete
    let resp = send(&mut app, authed("DELETE", &format!("/api/customer/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // get after delete is 404
    let resp = send(&mut app, authed("GET", &format!("/api/customer/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete is empty
    let resp = send(&mut app, authed("GET", "/api/customer", None)).await;
    let customers: Vec<Value> = body_json(resp).await;
    assert!(customers.is_empty());
}
