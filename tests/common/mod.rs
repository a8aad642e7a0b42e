#![allow(dead_code)]

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use redash_mcp::constants::env::{REDASH_API_KEY, REDASH_BASE_URL};

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub const TEST_API_KEY: &str = "test-api-key";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    requests: Arc<StdMutex<Vec<RecordedRequest>>>,
}

/// In-process stand-in for the Redash API. Answers every request with the
/// same status and body and records what it received.
pub struct StubRedash {
    pub base_url: String,
    requests: Arc<StdMutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubRedash {
    pub async fn start(status: u16, body: &str) -> Self {
        let requests = Arc::new(StdMutex::new(Vec::new()));
        let state = StubState {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_string(),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{}", addr),
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one remote request");
        requests.into_iter().next().expect("one request")
    }
}

impl Drop for StubRedash {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body,
    };
    state.requests.lock().expect("requests lock").push(recorded);
    (
        state.status,
        [(CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
        .into_response()
}

/// Sets the Redash credentials for the duration of a test and restores the
/// previous values on drop. Hold `ENV_LOCK` while this is alive.
pub struct RedashEnv {
    previous: Vec<(&'static str, Option<String>)>,
}

impl RedashEnv {
    pub fn set(base_url: Option<&str>, api_key: Option<&str>) -> Self {
        let previous = vec![
            (REDASH_BASE_URL, std::env::var(REDASH_BASE_URL).ok()),
            (REDASH_API_KEY, std::env::var(REDASH_API_KEY).ok()),
        ];
        apply(REDASH_BASE_URL, base_url);
        apply(REDASH_API_KEY, api_key);
        Self { previous }
    }

    pub fn for_stub(stub: &StubRedash) -> Self {
        Self::set(Some(&stub.base_url), Some(TEST_API_KEY))
    }
}

impl Drop for RedashEnv {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            apply(key, value.as_deref());
        }
    }
}

fn apply(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}
