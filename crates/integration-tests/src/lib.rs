//! Integration test harness for the pharmacy admin dashboard.
//!
//! [`MockBackend`] is an in-process stand-in for the pharmacy REST API that
//! keeps its records in memory and logs every call. [`spawn_dashboard`]
//! serves the real dashboard router against it on an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pharmacy-admin-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use pharmacy_admin::config::AdminConfig;
use pharmacy_admin::state::AppState;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// Expiry claim of the mock token: 2100-01-01.
pub const TOKEN_EXP: i64 = 4_102_444_800;

/// An unsigned JWT whose payload carries [`TOKEN_EXP`].
#[must_use]
pub fn mock_token() -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":1,"exp":{TOKEN_EXP}}}"#));
    format!("{header}.{payload}.mock-signature")
}

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockData {
    records: HashMap<String, Vec<Value>>,
    calls: Vec<Call>,
    revoked: bool,
    failing: Vec<String>,
    slow_searches: HashMap<String, Duration>,
}

/// In-memory pharmacy API.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    data: Arc<Mutex<MockData>>,
}

impl MockBackend {
    /// A backend seeded with [`fixtures`].
    #[must_use]
    pub fn seeded() -> Self {
        let backend = Self::default();
        backend.lock().records = fixtures();
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve on an ephemeral port and return the API root URL.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(&self) -> String {
        let app = Router::new().fallback(dispatch).with_state(self.clone());
        format!("http://{}", serve(app).await)
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// The most recent call whose path starts with `prefix`.
    #[must_use]
    pub fn last_call(&self, prefix: &str) -> Option<Call> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|c| c.path.starts_with(prefix))
            .cloned()
    }

    /// A stored record, by resource path and id.
    #[must_use]
    pub fn record(&self, resource: &str, id: i64) -> Option<Value> {
        self.lock()
            .records
            .get(resource)
            .and_then(|rows| rows.iter().find(|r| r["id"] == id).cloned())
    }

    /// Answer every further authenticated call with 401.
    pub fn revoke_token(&self) {
        self.lock().revoked = true;
    }

    /// Hold list calls whose `search` equals `term` for `delay` before answering.
    pub fn delay_search(&self, term: &str, delay: Duration) {
        self.lock().slow_searches.insert(term.to_string(), delay);
    }

    /// Answer calls under `resource` with 500.
    pub fn fail_resource(&self, resource: &str) {
        self.lock().failing.push(resource.to_string());
    }
}

/// Bind `app` to an ephemeral local port.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("Failed to bind test listener: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("Failed to read test listener address: {e}"));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Serve the dashboard against `api_url` and return its base URL.
///
/// # Panics
///
/// Panics if the configuration is rejected or no port can be bound.
pub async fn spawn_dashboard(api_url: &str) -> String {
    let api_url = api_url.to_string();
    let config = AdminConfig::from_vars(|key| match key {
        "API_BASE_URL" => Some(api_url.clone()),
        "API_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap_or_else(|e| panic!("Invalid test configuration: {e}"));
    let state = AppState::new(config).unwrap_or_else(|e| panic!("Failed to build state: {e}"));

    format!("http://{}", serve(pharmacy_admin::app(state)).await)
}

/// A browser-like client: keeps cookies, never follows redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|e| panic!("Failed to build HTTP client: {e}"))
}

/// Log `client` into the dashboard at `base`.
///
/// # Panics
///
/// Panics if the login request fails to send.
pub async fn login(client: &reqwest::Client, base: &str) -> reqwest::Response {
    client
        .post(format!("{base}/login"))
        .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .unwrap_or_else(|e| panic!("Login request failed: {e}"))
}

/// Seed records, keyed by resource path.
#[must_use]
pub fn fixtures() -> HashMap<String, Vec<Value>> {
    HashMap::from([
        (
            "admin".to_string(),
            vec![
                json!({"id": 1, "username": "admin", "fullname": "Quản trị viên", "is_active": true}),
                json!({"id": 2, "username": "linh", "fullname": "Nguyễn Linh", "is_active": false}),
            ],
        ),
        (
            "category".to_string(),
            vec![
                json!({"id": 1, "name": "Vitamin", "description": "Bổ sung vitamin", "is_sales": true}),
                json!({"id": 2, "name": "Thuốc ho", "description": null, "is_sales": true}),
                json!({"id": 3, "name": "Ngừng kinh doanh", "is_sales": false}),
            ],
        ),
        (
            "customer".to_string(),
            vec![json!({
                "id": 9,
                "email": "an@example.com",
                "fullname": "Trần An",
                "phonenumber": "0901234567",
                "is_active": true,
                "is_verified": true,
                "addresses": [{
                    "id": 1, "recipient_name": "Trần An", "phonenumber": "0901234567",
                    "address": "12 Lý Thường Kiệt", "district": "Quận 10", "city": "TP.HCM",
                    "is_default": true
                }],
                "orders": [{"id": 100, "total_price": 250_000, "status": "pending"}]
            })],
        ),
        (
            "product".to_string(),
            vec![
                json!({"id": 1, "name": "Vitamin C 500mg", "price": 120_000, "stock": 40,
                       "category_id": 1, "category": {"id": 1, "name": "Vitamin"}, "is_sales": true}),
                json!({"id": 2, "name": "Siro ho Prospan", "price": 85_000, "stock": 12,
                       "category_id": 2, "category": {"id": 2, "name": "Thuốc ho"}, "is_sales": true}),
                json!({"id": 3, "name": "Vitamin D3", "price": 150_000, "stock": 0,
                       "category_id": 1, "category": {"id": 1, "name": "Vitamin"}, "is_sales": false}),
            ],
        ),
        (
            "store".to_string(),
            vec![json!({"id": 4, "username": "q10", "name": "Nhà thuốc Quận 10",
                        "phonenumber": "0281234567", "address": "5 Ba Tháng Hai",
                        "district": "Quận 10", "city": "TP.HCM", "is_active": true})],
        ),
    ])
}

fn envelope(data: Value) -> Response {
    Json(json!({"status": "success", "data": data})).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "fail", "message": message}))).into_response()
}

/// The field `PATCH /status/{id}` flips.
fn status_field(resource: &str) -> &'static str {
    match resource {
        "product" | "category" => "is_sales",
        _ => "is_active",
    }
}

fn matches_search(record: &Value, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    ["name", "username", "fullname", "email", "phonenumber"]
        .iter()
        .filter_map(|field| record[*field].as_str())
        .any(|value| value.to_lowercase().contains(&needle))
}

fn matches_filters(record: &Value, resource: &str, query: &HashMap<String, String>) -> bool {
    if let Some(flag) = query.get("isSales") {
        let wanted = flag == "1";
        if record[status_field(resource)].as_bool().unwrap_or(false) != wanted {
            return false;
        }
    }
    if let Some(categories) = query.get("categories").filter(|c| !c.is_empty()) {
        let category = record["category_id"].as_i64().unwrap_or_default();
        if !categories
            .split(',')
            .filter_map(|id| id.parse::<i64>().ok())
            .any(|id| id == category)
        {
            return false;
        }
    }
    true
}

fn list(records: &[Value], resource: &str, query: &HashMap<String, String>) -> Value {
    let page = query.get("page").and_then(|p| p.parse::<usize>().ok()).unwrap_or(1).max(1);
    let limit = query.get("limit").and_then(|l| l.parse::<usize>().ok()).unwrap_or(10).max(1);
    let search = query.get("search").map(String::as_str).unwrap_or_default();

    let mut matched: Vec<&Value> = records
        .iter()
        .filter(|r| matches_search(r, search) && matches_filters(r, resource, query))
        .collect();
    match query.get("sortBy").map(String::as_str) {
        Some("price_asc") => matched.sort_by_key(|r| r["price"].as_i64().unwrap_or_default()),
        Some("price_desc") => {
            matched.sort_by_key(|r| std::cmp::Reverse(r["price"].as_i64().unwrap_or_default()));
        }
        _ => {}
    }

    let total_pages = matched.len().div_ceil(limit);
    let data: Vec<Value> = matched.into_iter().skip((page - 1) * limit).take(limit).cloned().collect();
    json!({"data": data, "totalPages": total_pages})
}

fn merge(record: &mut Value, patch: &Value) {
    if let (Some(target), Some(source)) = (record.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

async fn dispatch(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let path = uri.path().to_string();

    let delay = query
        .get("search")
        .and_then(|term| backend.lock().slow_searches.get(term).copied());
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut data = backend.lock();
    data.calls.push(Call {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    if segments == ["admin", "auth", "login"] && method == Method::POST {
        let body = body.unwrap_or_default();
        if body["username"] == ADMIN_USERNAME && body["password"] == ADMIN_PASSWORD {
            return Json(json!({
                "status": "success",
                "message": "Đăng nhập thành công",
                "data": {"token": mock_token()}
            }))
            .into_response();
        }
        return Json(json!({
            "status": "fail",
            "message": "Sai tên đăng nhập hoặc mật khẩu",
            "data": null
        }))
        .into_response();
    }

    let expected = format!("Bearer {}", mock_token());
    if data.revoked || authorization.as_deref() != Some(expected.as_str()) {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let Some((&resource, rest)) = segments.split_first() else {
        return failure(StatusCode::NOT_FOUND, "Not found");
    };
    let resource = resource.to_string();
    if data.failing.contains(&resource) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
    }
    let Some(records) = data.records.get_mut(&resource) else {
        return failure(StatusCode::NOT_FOUND, "Unknown resource");
    };

    let find = |records: &[Value], id: &str| {
        let id: i64 = id.parse().ok()?;
        records.iter().position(|r| r["id"] == id)
    };
    let id = match rest {
        ["create"] => None,
        [id] | ["status" | "reset-password", id] | [id, "reset-password"] => Some(*id),
        _ => None,
    };
    let found = id.and_then(|id| find(records.as_slice(), id));

    match (method, rest) {
        (Method::GET, [""]) => envelope(list(records, &resource, &query)),
        (Method::POST, ["create"]) => {
            let next_id = records.iter().filter_map(|r| r["id"].as_i64()).max().unwrap_or(0) + 1;
            let mut record = json!({ "id": next_id });
            record[status_field(&resource)] = Value::Bool(true);
            merge(&mut record, &body.unwrap_or_default());
            if let Some(object) = record.as_object_mut() {
                object.remove("password");
            }
            records.push(record.clone());
            envelope(record)
        }
        (Method::GET, [_]) => match found {
            Some(index) => envelope(records[index].clone()),
            None => failure(StatusCode::NOT_FOUND, "Not found"),
        },
        (Method::PUT, [_]) => match found {
            Some(index) => {
                merge(&mut records[index], &body.unwrap_or_default());
                envelope(records[index].clone())
            }
            None => failure(StatusCode::NOT_FOUND, "Not found"),
        },
        (Method::DELETE, [_]) => match found {
            Some(index) => {
                records.remove(index);
                envelope(Value::Null)
            }
            None => failure(StatusCode::NOT_FOUND, "Not found"),
        },
        (Method::PATCH, ["status", _]) => match found {
            Some(index) => {
                let field = status_field(&resource);
                let current = records[index][field].as_bool().unwrap_or(false);
                records[index][field] = Value::Bool(!current);
                envelope(Value::Null)
            }
            None => failure(StatusCode::NOT_FOUND, "Not found"),
        },
        (Method::PATCH, ["reset-password", _] | [_, "reset-password"]) => match found {
            Some(_) => envelope(Value::Null),
            None => failure(StatusCode::NOT_FOUND, "Not found"),
        },
        _ => failure(StatusCode::NOT_FOUND, "Not found"),
    }
}
