//! In-process stand-in for the REST API plus a view that records renders.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use common::api::ApiClient;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::controller::Controller;
use crate::session::MemorySessionStore;
use crate::view::{OutputArea, Rendered, View};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: String,
}

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<HashMap<(String, String), Reply>>>,
}

/// Answers every request with a scripted reply keyed by `(method, path)`,
/// or `200 {"message":"ok"}` when nothing is scripted.
pub struct MockApi {
    pub base_url: String,
    state: MockState,
}

impl MockApi {
    pub async fn start() -> anyhow::Result<Self> {
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr: SocketAddr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock api error: {}", e);
            }
        });
        Ok(Self { base_url: format!("http://{}:{}", addr.ip(), addr.port()), state })
    }

    pub fn reply(&self, method: &str, path: &str, status: u16, body: Value) {
        self.reply_raw(method, path, status, &body.to_string());
    }

    pub fn reply_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        let reply = Reply { status: StatusCode::from_u16(status).unwrap(), body: body.to_string() };
        self.state
            .replies
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), reply);
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).unwrap()
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: if body.is_empty() { None } else { serde_json::from_slice(&body).ok() },
    };
    let key = (recorded.method.clone(), recorded.path.clone());
    state.calls.lock().unwrap().push(recorded);

    let reply = state.replies.lock().unwrap().get(&key).cloned().unwrap_or(Reply {
        status: StatusCode::OK,
        body: json!({ "message": "ok" }).to_string(),
    });
    (reply.status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[derive(Default)]
pub struct RecordingView {
    renders: Mutex<Vec<(OutputArea, Rendered)>>,
    labels: Mutex<Vec<Option<i64>>>,
}

impl RecordingView {
    pub fn renders(&self, area: OutputArea) -> Vec<Rendered> {
        self.renders
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| *a == area)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn last(&self, area: OutputArea) -> Option<Rendered> {
        self.renders(area).pop()
    }

    pub fn labels(&self) -> Vec<Option<i64>> {
        self.labels.lock().unwrap().clone()
    }
}

impl View for RecordingView {
    fn render(&self, area: OutputArea, output: &Rendered) {
        self.renders.lock().unwrap().push((area, output.clone()));
    }

    fn show_user_id(&self, user_id: Option<i64>) {
        self.labels.lock().unwrap().push(user_id);
    }
}

pub struct Harness {
    pub controller: Controller,
    pub view: Arc<RecordingView>,
    pub store: Arc<MemorySessionStore>,
}

pub fn harness(api: ApiClient) -> Harness {
    harness_with_store(api, Arc::new(MemorySessionStore::default()))
}

pub fn harness_with_store(api: ApiClient, store: Arc<MemorySessionStore>) -> Harness {
    let view = Arc::new(RecordingView::default());
    let controller = Controller::new(api, store.clone(), view.clone());
    Harness { controller, view, store }
}
