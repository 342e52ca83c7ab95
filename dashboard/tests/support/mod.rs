//! Transports for driving the dashboard without sockets.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::{oneshot, Notify};
use tower::ServiceExt;
use tutor_backend::store::Store;
use tutor_backend::{app, AdminAccount, AppState};
use tutor_core::{HttpMethod, HttpRequest, HttpResponse};
use tutor_dashboard::error::TransportError;
use tutor_dashboard::transport::Transport;
use tutor_dashboard::DashboardState;

pub const BACKEND_URL: &str = "http://backend.test";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// Serves requests from an in-process backend router and records
/// `"METHOD /path"` for each one.
pub struct RouterTransport {
    app: Router,
    seen: Mutex<Vec<String>>,
}

impl RouterTransport {
    pub fn seeded() -> Self {
        Self {
            app: app(AppState::new(
                Store::seeded(),
                AdminAccount {
                    username: ADMIN_USER.to_string(),
                    password: ADMIN_PASSWORD.to_string(),
                },
            )),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let uri = request
            .path
            .strip_prefix(BACKEND_URL)
            .unwrap_or(&request.path)
            .to_string();
        self.seen
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method.as_str(), uri));

        let mut builder = Request::builder().method(request.method.as_str()).uri(uri);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let http_request = builder
            .body(Body::from(request.body.unwrap_or_default()))
            .unwrap();

        let response = self.app.clone().oneshot(http_request).await.unwrap();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        })
    }
}

/// A backend that is never there.
pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connect("backend down".to_string()))
    }
}

pub fn seeded_dashboard() -> (DashboardState, Arc<RouterTransport>) {
    let transport = Arc::new(RouterTransport::seeded());
    let state = DashboardState::new(BACKEND_URL, transport.clone()).unwrap();
    (state, transport)
}

/// Delegates to a `RouterTransport`, but fails every `GET /students`.
pub struct NoStudentList(pub RouterTransport);

#[async_trait]
impl Transport for NoStudentList {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.method == HttpMethod::Get && request.path == format!("{BACKEND_URL}/students") {
            return Err(TransportError::Connect("student list unavailable".to_string()));
        }
        self.0.execute(request).await
    }
}

/// Delegates to a `RouterTransport`, but holds the first `GET /students`
/// until `release` is called.
pub struct HeldStudentList {
    inner: RouterTransport,
    held: Mutex<Option<oneshot::Receiver<()>>>,
    release: Mutex<Option<oneshot::Sender<()>>>,
    reached: Notify,
}

impl HeldStudentList {
    pub fn seeded() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            inner: RouterTransport::seeded(),
            held: Mutex::new(Some(rx)),
            release: Mutex::new(Some(tx)),
            reached: Notify::new(),
        }
    }

    /// Resolves once the held request is waiting.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        if let Some(tx) = self.release.lock().unwrap().take() {
            let _ = tx.send(());
        }
    }
}

#[async_trait]
impl Transport for HeldStudentList {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.method == HttpMethod::Get && request.path == format!("{BACKEND_URL}/students") {
            let held = self.held.lock().unwrap().take();
            if let Some(rx) = held {
                self.reached.notify_one();
                let _ = rx.await;
            }
        }
        self.inner.execute(request).await
    }
}
