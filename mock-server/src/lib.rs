use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Path segments served under `/api/`.
pub const RESOURCES: [&str; 14] = [
    "customer",
    "address",
    "productcategory",
    "servicecategory",
    "contact",
    "opportunity",
    "lead",
    "product",
    "service",
    "sale",
    "vendor",
    "supportcase",
    "todotask",
    "reward",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub message: String,
}

/// In-memory backing store: records per resource, users and issued tokens.
#[derive(Debug, Default)]
pub struct Store {
    tables: HashMap<String, BTreeMap<i64, Map<String, Value>>>,
    next_id: i64,
    users: HashMap<String, String>,
    tokens: HashMap<String, String>,
}

impl Store {
    /// Store that accepts `token` as already issued to `email`.
    pub fn with_token(mut self, email: &str, token: &str) -> Self {
        self.tokens.insert(token.to_string(), email.to_string());
        self
    }

    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        self.users.insert(email.to_string(), password.to_string());
        self
    }

    fn insert(&mut self, resource: &str, mut record: Map<String, Value>) -> Map<String, Value> {
        self.next_id += 1;
        let id = self.next_id;
        record.insert("id".to_string(), Value::from(id));
        self.tables
            .entry(resource.to_string())
            .or_default()
            .insert(id, record.clone());
        record
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/identity/register", post(register))
        .route("/identity/login", post(login))
        .route("/identity/validate-token", get(validate_token))
        .route("/api/{resource}", get(list_records).post(create_record))
        .route(
            "/api/{resource}/{id}",
            get(get_record).put(replace_record).delete(delete_record),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "message": message.into() }))).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject the request unless it carries an issued token and names a known
/// resource.
fn authorize(store: &Store, headers: &HeaderMap, resource: &str) -> Result<(), Response> {
    match bearer_token(headers) {
        Some(token) if store.tokens.contains_key(token) => {}
        _ => return Err(error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
    if !RESOURCES.contains(&resource) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown resource '{resource}'") })),
        )
            .into_response());
    }
    Ok(())
}

async fn register(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut store = db.write().await;
    if input.email.trim().is_empty() || input.password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Email and password are required.");
    }
    if store.users.contains_key(&input.email) {
        return error(StatusCode::BAD_REQUEST, format!("User '{}' already exists.", input.email));
    }
    info!(email = %input.email, "user registered");
    store.users.insert(input.email, input.password);
    (StatusCode::OK, Json(json!({ "message": "User registered." }))).into_response()
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut store = db.write().await;
    if store.users.get(&input.email) != Some(&input.password) {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password.");
    }
    let token = Uuid::new_v4().to_string();
    info!(email = %input.email, "login");
    store.tokens.insert(token.clone(), input.email);
    Json(LoginResponse {
        access_token: token,
        message: "Login successful.".to_string(),
    })
    .into_response()
}

async fn validate_token(State(db): State<Db>, headers: HeaderMap) -> Response {
    let store = db.read().await;
    match bearer_token(&headers).and_then(|t| store.tokens.get(t)) {
        Some(email) => Json(json!({ "email": email })).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn list_records(
    State(db): State<Db>,
    Path(resource): Path<String>,
    headers: HeaderMap,
) -> Response {
    let store = db.read().await;
    if let Err(resp) = authorize(&store, &headers, &resource) {
        return resp;
    }
    let records: Vec<&Map<String, Value>> = store
        .tables
        .get(&resource)
        .map(|table| table.values().collect())
        .unwrap_or_default();
    Json(records).into_response()
}

async fn create_record(
    State(db): State<Db>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    let mut store = db.write().await;
    if let Err(resp) = authorize(&store, &headers, &resource) {
        return resp;
    }
    let Value::Object(record) = input else {
        return error(StatusCode::BAD_REQUEST, "Request body must be a JSON object.");
    };
    let created = store.insert(&resource, record);
    debug!(%resource, id = store.next_id, "record created");
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn get_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    let store = db.read().await;
    if let Err(resp) = authorize(&store, &headers, &resource) {
        return resp;
    }
    match store.tables.get(&resource).and_then(|t| t.get(&id)) {
        Some(record) => Json(record).into_response(),
        None => error(StatusCode::NOT_FOUND, format!("{resource} {id} not found")),
    }
}

/// Full replacement: the stored record becomes exactly the body, with the
/// path id.
async fn replace_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, i64)>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    let mut store = db.write().await;
    if let Err(resp) = authorize(&store, &headers, &resource) {
        return resp;
    }
    let Value::Object(mut record) = input else {
        return error(StatusCode::BAD_REQUEST, "Request body must be a JSON object.");
    };
    let Some(slot) = store.tables.get_mut(&resource).and_then(|t| t.get_mut(&id)) else {
        return error(StatusCode::NOT_FOUND, format!("{resource} {id} not found"));
    };
    record.insert("id".to_string(), Value::from(id));
    *slot = record;
    debug!(%resource, id, "record replaced");
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_record(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut store = db.write().await;
    if let Err(resp) = authorize(&store, &headers, &resource) {
        return resp;
    }
    match store.tables.get_mut(&resource).and_then(|t| t.remove(&id)) {
        Some(_) => {
            debug!(%resource, id, "record deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, format!("{resource} {id} not found")),
    }
}
