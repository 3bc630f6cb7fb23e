#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use api_types::auth::{Role, SignedIn};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
    routing::{any, get, post, put},
};
use leadbook::{
    api::Api,
    gateway::Gateway,
    session::{Session, SessionObserver, SessionStore},
};
use serde_json::{Value, json};

/// Requests seen by the stub, newest last.
#[derive(Clone, Default)]
pub struct Seen(Arc<Mutex<Vec<Value>>>);

impl Seen {
    fn push(&self, value: Value) {
        self.0.lock().unwrap().push(value);
    }

    pub fn last(&self) -> Value {
        self.0.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

#[derive(Default)]
pub struct CountingObserver(AtomicUsize);

impl CountingObserver {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl SessionObserver for CountingObserver {
    fn on_session_invalidated(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Value {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map_or(Value::Null, |value| Value::String(value.to_string()))
}

async fn record(
    State(seen): State<Seen>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let request = json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": header_value(&headers, header::AUTHORIZATION),
        "content_type": header_value(&headers, header::CONTENT_TYPE),
        "body": String::from_utf8_lossy(&body),
    });
    seen.push(request.clone());
    Json(request)
}

async fn mutation(State(seen): State<Seen>, uri: Uri, body: Bytes) -> Json<Value> {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    seen.push(json!({ "path": uri.path(), "body": body }));
    Json(json!({ "message": "Saved" }))
}

async fn sign_in(Json(body): Json<Value>) -> axum::response::Response {
    match body["email"].as_str() {
        Some("busy@institute.in") => {
            (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
        }
        Some("user@institute.in") => Json(json!({
            "data": { "accessToken": "user-token", "role": "user", "name": "Ravi" }
        }))
        .into_response(),
        _ => Json(json!({
            "data": { "accessToken": "admin-token", "role": "admin", "name": "Anu" }
        }))
        .into_response(),
    }
}

pub fn enquiry_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "phone": "9876543210",
        "course": "Full Stack",
        "course_fee": 10000,
        "are_you": "Fresher",
        "currently_working_in": "IT",
        "learning_mode": "Online",
        "source": "Meta",
        "status": "Pending",
        "attender": "Ravi",
        "follow_up_date": "",
        "note": "",
        "payments": [
            { "payment_date": "2025-03-01T10:00:00.000Z", "payment_mode": "Cash", "paid_amount": 4000 }
        ],
        "paid_amount": 0,
        "balance_amount": 0,
        "payment_status": "Unpaid",
        "history": []
    })
}

#[derive(serde::Deserialize)]
struct Range {
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "endDate")]
    end_date: String,
}

/// January windows answer slowly with one enquiry, anything else answers
/// at once with two.
async fn enquiries(State(seen): State<Seen>, Query(range): Query<Range>) -> Json<Value> {
    seen.push(json!({ "startDate": range.start_date, "endDate": range.end_date }));
    if range.start_date.starts_with("2025-01") {
        tokio::time::sleep(Duration::from_millis(300)).await;
        return Json(json!([enquiry_json("e1", "Asha")]));
    }
    Json(json!([
        enquiry_json("e1", "Asha"),
        enquiry_json("e2", "Vikram")
    ]))
}

async fn courses() -> Json<Value> {
    Json(json!({
        "data": [
            { "_id": "c1", "title": "Full Stack", "fee": 10000 },
            { "_id": "c2", "title": "Data Science ", "fee": 25000.5 }
        ]
    }))
}

async fn members() -> Json<Value> {
    Json(json!({
        "data": [
            { "_id": "u1", "name": "Anu", "email": "anu@institute.in", "role": "admin" },
            { "_id": "u2", "name": "Ravi", "email": "ravi@institute.in", "role": "user" }
        ]
    }))
}

async fn delete_course(Path(id): Path<String>, method: Method, body: Bytes) -> Json<Value> {
    Json(json!({
        "message": format!("{} {id} with {} body bytes", method.as_str(), body.len())
    }))
}

fn router(seen: Seen) -> Router {
    Router::new()
        .route("/api/record", any(record))
        .route(
            "/api/expired",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Not authorized" })),
                )
            }),
        )
        .route(
            "/api/expired-text",
            get(|| async { (StatusCode::FORBIDDEN, "Not authorized") }),
        )
        .route(
            "/api/busy",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "Too many requests") }),
        )
        .route(
            "/api/broken",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Database down" })),
                )
            }),
        )
        .route(
            "/api/bare-failure",
            get(|| async { StatusCode::BAD_GATEWAY }),
        )
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
        .route("/api/user/signin", post(sign_in))
        .route("/api/enquiries", get(enquiries))
        .route("/api/student/{id}", put(mutation))
        .route("/api/create-student", post(mutation))
        .route("/api/upload-students", post(mutation))
        .route("/api/course", get(courses))
        .route("/api/course/add_course", post(mutation))
        .route("/api/course/{id}", axum::routing::delete(delete_course))
        .route("/api/user/members", get(members))
        .with_state(seen)
}

pub struct Backend {
    pub base_url: String,
    pub seen: Seen,
}

pub async fn spawn_backend() -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let seen = Seen::default();
    let app = router(seen.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Backend {
        base_url: format!("http://{addr}/api"),
        seen,
    }
}

pub fn signed_in(role: Role) -> Arc<SessionStore> {
    let store = SessionStore::in_memory(Session::default());
    store
        .sign_in(SignedIn {
            access_token: "t0k".to_string(),
            role,
            name: "Anu".to_string(),
        })
        .unwrap();
    Arc::new(store)
}

pub fn signed_out() -> Arc<SessionStore> {
    Arc::new(SessionStore::in_memory(Session::default()))
}

pub fn gateway(backend: &Backend, session: Arc<SessionStore>) -> Gateway {
    Gateway::new(&backend.base_url, Duration::from_secs(5), session).unwrap()
}

pub fn api(backend: &Backend, session: Arc<SessionStore>) -> Api {
    Api::new(gateway(backend, session))
}
