//! In-process ritual API used by the integration tests.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
pub struct MockApi {
    calls: Arc<Mutex<Vec<String>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

impl MockApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Authorization headers seen so far.
    pub fn auth_headers(&self) -> Vec<String> {
        self.auth.lock().unwrap().clone()
    }

    fn record(&self, headers: &HeaderMap, call: String) {
        if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            self.auth.lock().unwrap().push(value.to_string());
        }
        self.calls.lock().unwrap().push(call);
    }

    /// Poll until `pred` holds for the recorded calls or `timeout` passes.
    pub async fn wait_for<F>(&self, timeout: Duration, pred: F) -> Vec<String>
    where
        F: Fn(&[String]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if pred(&calls) || tokio::time::Instant::now() >= deadline {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub fn morning_puja() -> Value {
    json!({
        "id": "morning-puja",
        "name": "Morning Puja",
        "category": "daily",
        "duration_minutes": 2,
        "deity": "Ganesha",
        "benefits": ["Removes obstacles"],
        "steps": [
            {
                "step_number": 1,
                "title": "Light the lamp",
                "instruction": "Light the ghee lamp and place it to the right.",
                "duration_seconds": 30,
                "items_needed": ["diya", "ghee"]
            },
            {
                "step_number": 2,
                "title": "Offer flowers",
                "instruction": "Offer flowers with both hands.",
                "duration_seconds": 45
            },
            {
                "step_number": 3,
                "title": "Chant the mantra",
                "instruction": "Chant eleven times.",
                "mantra": "ॐ गं गणपतये नमः",
                "mantra_transliteration": "Om Gam Ganapataye Namaha",
                "duration_seconds": 20
            }
        ]
    })
}

fn summary(ritual: &Value) -> Value {
    json!({
        "id": ritual["id"],
        "name": ritual["name"],
        "category": ritual["category"],
        "duration_minutes": ritual["duration_minutes"],
        "step_count": ritual["steps"].as_array().map(|s| s.len()).unwrap_or(0),
    })
}

async fn list_rituals(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    api.record(&headers, "list".to_string());
    let ritual = morning_puja();
    let matches = query
        .get("category")
        .is_none_or(|c| ritual["category"].as_str() == Some(c.as_str()));
    if matches {
        Json(json!([summary(&ritual)]))
    } else {
        Json(json!([]))
    }
}

async fn get_ritual(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(StatusCode, String), StatusCode> {
    api.record(&headers, format!("get:{}", id));
    match id.as_str() {
        "morning-puja" => Ok((StatusCode::OK, morning_puja().to_string())),
        "garbled" => Ok((StatusCode::OK, "<html>not json</html>".to_string())),
        "flaky" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn create_session(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Json<Value> {
    api.record(&headers, format!("create:{}", id));
    Json(json!({ "session_id": format!("sess-{}", id) }))
}

async fn progress(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    api.record(&headers, format!("progress:{}:{}", sid, body["current_step"]));
    StatusCode::NO_CONTENT
}

async fn pause(State(api): State<MockApi>, headers: HeaderMap, Path(sid): Path<String>) -> StatusCode {
    api.record(&headers, format!("pause:{}", sid));
    StatusCode::NO_CONTENT
}

async fn resume(State(api): State<MockApi>, headers: HeaderMap, Path(sid): Path<String>) -> StatusCode {
    api.record(&headers, format!("resume:{}", sid));
    StatusCode::NO_CONTENT
}

async fn complete(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(sid): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    api.record(&headers, format!("complete:{}:{}", sid, body["rating"]));
    StatusCode::NO_CONTENT
}

async fn abandon(State(api): State<MockApi>, headers: HeaderMap, Path(sid): Path<String>) -> StatusCode {
    api.record(&headers, format!("abandon:{}", sid));
    StatusCode::NO_CONTENT
}

/// Serve the mock API on an ephemeral port of the current runtime.
pub async fn spawn_api() -> (String, MockApi) {
    let api = MockApi::default();
    let app = Router::new()
        .route("/rituals", get(list_rituals))
        .route("/rituals/{id}", get(get_ritual))
        .route("/rituals/{id}/sessions", post(create_session))
        .route("/sessions/{sid}/progress", patch(progress))
        .route("/sessions/{sid}/pause", post(pause))
        .route("/sessions/{sid}/resume", post(resume))
        .route("/sessions/{sid}/complete", post(complete))
        .route("/sessions/{sid}/abandon", post(abandon))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), api)
}

/// Serve the mock API from a background thread, for blocking tests.
pub fn spawn_api_thread() -> (String, MockApi) {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            tx.send(spawn_api().await).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}
