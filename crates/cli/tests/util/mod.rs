//! A stand-in for the benchmark server, serving `/submit` and `/status/{id}`
//! on an ephemeral port.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const BAD_KEY: &str = "wrong-key";
pub const THROTTLED_KEY: &str = "throttled";
pub const CRASHING_MODEL: &str = "crash-model";
/// Submissions for this model are answered after [`SLOW_REPLY`].
pub const SLOW_MODEL: &str = "slow-model";
pub const SLOW_REPLY: std::time::Duration = std::time::Duration::from_secs(3);

/// One scripted reply of `GET /status/{id}`.
#[derive(Debug, Clone)]
pub enum StatusReply {
    Json(Value),
    Raw(StatusCode, String),
}

#[derive(Debug, Clone, Default)]
pub struct Received {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub contents: Vec<u8>,
    pub model_name: Option<String>,
    pub key: Option<String>,
}

#[derive(Default)]
pub struct Shared {
    pub received: Vec<Received>,
    /// Bodies handed out by successive `GET /status/{id}` calls.
    pub statuses: VecDeque<StatusReply>,
}

pub struct FakeServer {
    pub url: String,
    pub shared: Arc<Mutex<Shared>>,
}

impl FakeServer {
    /// Serve on a background thread with its own runtime, so both sync and async tests can use it.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let shared = Arc::new(Mutex::new(Shared::default()));

        let app = Router::new()
            .route("/submit", post(submit))
            .route("/status/:id", get(status))
            .with_state(shared.clone());

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        FakeServer { url, shared }
    }

    pub fn push_status(&self, body: Value) {
        self.push_reply(StatusReply::Json(body));
    }

    pub fn push_raw_status(&self, code: StatusCode, body: &str) {
        self.push_reply(StatusReply::Raw(code, body.to_string()));
    }

    fn push_reply(&self, reply: StatusReply) {
        self.shared.lock().unwrap().statuses.push_back(reply);
    }

    pub fn received(&self) -> Vec<Received> {
        self.shared.lock().unwrap().received.clone()
    }
}

async fn submit(State(shared): State<Arc<Mutex<Shared>>>, mut multipart: Multipart) -> Response {
    let mut received = Received::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or_default().to_string().as_str() {
            "file" => {
                received.file_name = field.file_name().map(str::to_string);
                received.content_type = field.content_type().map(str::to_string);
                received.contents = field.bytes().await.unwrap().to_vec();
            }
            "model_name" => received.model_name = Some(field.text().await.unwrap()),
            "key" => received.key = Some(field.text().await.unwrap()),
            _ => {}
        }
    }
    let key = received.key.clone().unwrap_or_default();
    let model = received.model_name.clone().unwrap_or_default();
    let predictions: Value = serde_json::from_slice(&received.contents).unwrap_or(Value::Null);
    shared.lock().unwrap().received.push(received);

    if key == BAD_KEY {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "Invalid key"}))).into_response();
    }
    if key == THROTTLED_KEY {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }
    if model == SLOW_MODEL {
        tokio::time::sleep(SLOW_REPLY).await;
    }
    if model == CRASHING_MODEL {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "judge unavailable"})),
        )
            .into_response();
    }
    match predictions.as_object() {
        Some(map) if !map.is_empty() => Json(json!({
            "success": true,
            "submission_id": "sub-1",
            "queue_position": 2
        }))
        .into_response(),
        _ => Json(json!({
            "success": false,
            "error": "Validation failed",
            "details": ["No predictions found"]
        }))
        .into_response(),
    }
}

async fn status(State(shared): State<Arc<Mutex<Shared>>>, Path(id): Path<String>) -> Response {
    if id != "sub-1" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Unknown submission"}))).into_response();
    }
    let next = shared.lock().unwrap().statuses.pop_front();
    match next {
        Some(StatusReply::Json(body)) => Json(body).into_response(),
        Some(StatusReply::Raw(code, body)) => (code, body).into_response(),
        None => Json(json!({"status": "completed", "completed_at": "2025-01-01T00:00:00"})).into_response(),
    }
}
