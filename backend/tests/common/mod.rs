#![allow(dead_code)]
use std::{
    collections::HashMap,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use time::macros::time;
use uuid::Uuid;

use timetable_backend::{
    api,
    timetable::{assignments::AssignmentCache, clock::FixedClock},
    upstream::UpstreamClient,
    AppState,
};

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, (u16, Value)>>>,
    hits: Arc<AtomicUsize>,
    last_auth: Arc<Mutex<Option<String>>>,
    latency: Arc<Mutex<Duration>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// Stand-in for the school REST API. Responses are keyed by path and query
/// below `/api`, e.g. `/academics/classes/?page=2`.
pub struct MockUpstream {
    pub addr: SocketAddr,
    state: MockState,
}

async fn mock_handler(State(state): State<MockState>, headers: HeaderMap, uri: Uri) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let running = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak_in_flight.fetch_max(running, Ordering::SeqCst);
    let latency = *state.latency.lock().unwrap();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    *state.last_auth.lock().unwrap() = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let full = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let key = full.strip_prefix("/api").unwrap_or(full).to_string();
    let found = state.routes.lock().unwrap().get(&key).cloned();
    match found {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap(),
            Json(body),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .fallback(mock_handler)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (200, body));
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, json!({ "detail": "error" })));
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.state.latency.lock().unwrap() = latency;
    }

    /// Most requests the mock has been serving at once.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_auth(&self) -> Option<String> {
        self.state.last_auth.lock().unwrap().clone()
    }

    pub fn client(&self) -> UpstreamClient {
        self.client_with_max_pages(50)
    }

    pub fn client_with_max_pages(&self, max_pages: usize) -> UpstreamClient {
        UpstreamClient::new(&self.base_url(), Duration::from_secs(5), max_pages)
            .expect("Failed to build upstream client")
    }
}

/// Fresh cache directory under the system temp dir.
pub fn temp_cache() -> (AssignmentCache, PathBuf) {
    let dir = std::env::temp_dir().join(format!("timetable-cache-{}", Uuid::new_v4()));
    (AssignmentCache::new(&dir), dir)
}

/// Spin up the service against `upstream`, returning its address and the
/// clock it reads. The clock starts on Monday 08:45.
pub async fn setup_test_app(upstream: &MockUpstream) -> (SocketAddr, Arc<FixedClock>) {
    let (cache, _) = temp_cache();
    setup_test_app_with_cache(upstream, cache).await
}

pub async fn setup_test_app_with_cache(
    upstream: &MockUpstream,
    cache: AssignmentCache,
) -> (SocketAddr, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(1, time!(08:45:00)));
    let state = AppState {
        upstream: upstream.client(),
        cache,
        clock: clock.clone(),
        period_refresh: Duration::from_millis(50),
    };

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, clock)
}

/// Build a reqwest client (reusable across requests in a test).
pub fn http_client() -> reqwest::Client {
    reqwest::Client::new()
}

pub async fn get_json(addr: SocketAddr, path_and_query: &str) -> (u16, Value) {
    let resp = http_client()
        .get(format!("http://{}{}", addr, path_and_query))
        .send()
        .await
        .expect("Request failed");
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// A small school: two plans on one template (Mon/Wed/Fri, two lessons and a
/// break), two classes listed over two pages, two teachers.
///
/// Plan 1 carries server assignments; plan 2 has none.
pub fn seed_school(mock: &MockUpstream) {
    mock.respond(
        "/academics/timetable/plans/",
        json!([
            { "id": 1, "name": "Term 1 Plan", "template": 10,
              "term_detail": { "name": "Term 1", "number": 1, "academic_year_label": "2026/2027" } },
            { "id": 2, "name": "Term 2 Plan", "template": 10 },
        ]),
    );
    mock.respond(
        "/academics/timetable/plans/1/",
        json!({
            "id": 1, "name": "Term 1 Plan", "template": 10,
            "term_detail": { "name": "Term 1", "number": 1, "academic_year_label": "2026/2027" },
            "block_assignments": {
                "1-100-1": { "subjectId": 501 },
                "1-101-1": { "subjectId": 501 },
                "1-100-2": { "subjectId": 502 },
                "3-101-2": { "subjectId": 503 },
            }
        }),
    );
    mock.respond(
        "/academics/timetable/plans/2/",
        json!({ "id": 2, "name": "Term 2 Plan", "template": 10, "block_assignments": null }),
    );
    mock.respond(
        "/academics/timetable/templates/10/",
        json!({ "id": 10, "days_active": [5, 1, 3] }),
    );
    mock.respond(
        "/academics/timetable/periods/?template=10",
        json!([
            { "period_index": 2, "kind": "lesson", "start_time": "08:40:00", "end_time": "09:20:00" },
            { "period_index": 1, "kind": "lesson", "start_time": "08:00:00", "end_time": "08:40:00" },
            { "period_index": 3, "kind": "break", "label": "Break", "start_time": "09:20:00", "end_time": "09:40" },
        ]),
    );
    mock.respond(
        "/academics/classes/",
        json!({
            "results": [ { "id": 100, "name": "7A" } ],
            "next": mock.url("/academics/classes/?page=2"),
        }),
    );
    mock.respond(
        "/academics/classes/?page=2",
        json!({ "results": [ { "id": 101, "name": "7B" } ], "next": null }),
    );
    mock.respond(
        "/academics/classes/100/",
        json!({
            "id": 100, "name": "7A", "grade_level": 7,
            "subjects": [
                { "id": 501, "code": "MATH", "name": "Mathematics" },
                { "id": 502, "code": "ENG", "name": "English" },
            ],
            "class_teacher_detail": { "id": 8, "user": { "id": 80, "username": "msmith" } }
        }),
    );
    mock.respond(
        "/academics/classes/101/",
        json!({
            "id": 101, "name": "7B", "grade_level": "7",
            "subjects": [
                { "id": 501, "code": "MATH", "name": "Mathematics" },
                { "id": 503, "code": "", "name": "Art" },
            ],
            "class_teacher_detail": { "id": 7, "user": { "id": 70, "first_name": "Jane", "last_name": "Doe" } }
        }),
    );
    mock.respond(
        "/academics/class_subject_teachers/?klass=100",
        json!([
            { "klass": 100, "subject": 501, "teacher": 7,
              "teacher_detail": { "id": 7, "user": { "id": 70, "first_name": "Jane", "last_name": "Doe", "username": "jdoe" } } },
            { "klass": 100, "subject": 502,
              "teacher_detail": { "id": 8, "first_name": "", "last_name": "", "username": "msmith", "user": { "id": 80 } } },
        ]),
    );
    mock.respond(
        "/academics/class_subject_teachers/?klass=101",
        json!({ "results": [
            { "klass": 101, "subject": { "id": 501, "code": "MATH", "name": "Mathematics" },
              "teacher_detail": { "id": 7, "user": { "id": 70, "first_name": "Jane", "last_name": "Doe", "username": "jdoe" } } },
        ], "next": null }),
    );
    mock.respond(
        "/academics/teachers/",
        json!([
            { "id": 7, "user": { "id": 70, "first_name": "Jane", "last_name": "Doe", "username": "jdoe" } },
            { "id": 8, "user": { "id": 80, "first_name": "", "last_name": "", "username": "msmith" } },
        ]),
    );
}
