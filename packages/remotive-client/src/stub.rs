//! Local stand-in for the listings endpoint, served with axum.
//!
//! Enabled with the `stub` feature. Serves canned listings per search term,
//! records the decoded query of every request, and can be told to stall,
//! fail, return a broken body, or ignore `limit` the way a misbehaving
//! upstream would.
//!
//! ```rust,ignore
//! use remotive_client::stub::StubApi;
//!
//! let stub = StubApi::new().with_jobs("python", jobs).start().await?;
//! let client = RemotiveClient::with_base_url(stub.url());
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::RawJob;

pub const STUB_PATH: &str = "/api/remote-jobs";

type Requests = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Canned behavior for the stub endpoint.
#[derive(Debug, Clone, Default)]
pub struct StubApi {
    listings: HashMap<String, Vec<RawJob>>,
    delays: HashMap<String, Duration>,
    ignore_limit: bool,
    status: Option<(u16, String)>,
    raw_body: Option<String>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listings returned for `term`. Unknown terms get an empty `jobs` array.
    pub fn with_jobs(mut self, term: impl Into<String>, jobs: Vec<RawJob>) -> Self {
        self.listings.insert(term.into(), jobs);
        self
    }

    /// Stall before answering searches for `term`.
    pub fn with_delay(mut self, term: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(term.into(), delay);
        self
    }

    /// Return every listing regardless of the `limit` parameter.
    pub fn ignoring_limit(mut self) -> Self {
        self.ignore_limit = true;
        self
    }

    /// Answer every request with `status` and a plain-text body.
    pub fn with_status(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some((status, body.into()));
        self
    }

    /// Answer every request with `body` verbatim as JSON content.
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    /// Bind an ephemeral local port and start serving.
    pub async fn start(self) -> std::io::Result<RunningStub> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests: Requests = Arc::default();

        let state = Arc::new(StubState {
            api: self,
            requests: requests.clone(),
        });
        let app = Router::new()
            .route(STUB_PATH, get(list_jobs))
            .with_state(state);

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "Stub listings API stopped");
            }
        });

        Ok(RunningStub {
            addr,
            requests,
            server,
        })
    }
}

/// A stub bound to a local port. Stops serving when dropped.
pub struct RunningStub {
    addr: SocketAddr,
    requests: Requests,
    server: JoinHandle<()>,
}

impl RunningStub {
    /// Endpoint URL to hand to `RemotiveClient::with_base_url`.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, STUB_PATH)
    }

    /// Decoded query parameters of every request received so far.
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for RunningStub {
    fn drop(&mut self) {
        self.server.abort();
    }
}

struct StubState {
    api: StubApi,
    requests: Requests,
}

async fn list_jobs(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(params.clone());

    let term = params.get("search").map(String::as_str).unwrap_or_default();
    if let Some(delay) = state.api.delays.get(term) {
        tokio::time::sleep(*delay).await;
    }

    if let Some((status, body)) = &state.api.status {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, body.clone()).into_response();
    }

    if let Some(body) = &state.api.raw_body {
        return ([(header::CONTENT_TYPE, "application/json")], body.clone()).into_response();
    }

    let mut jobs = state.api.listings.get(term).cloned().unwrap_or_default();
    if !state.api.ignore_limit {
        if let Some(limit) = params.get("limit").and_then(|l| l.parse::<usize>().ok()) {
            jobs.truncate(limit);
        }
    }

    Json(jobs_body(&jobs)).into_response()
}

/// A `{"jobs": [...]}` response body with the given listings.
pub fn jobs_body(jobs: &[RawJob]) -> Value {
    json!({ "job-count": jobs.len(), "jobs": jobs })
}
