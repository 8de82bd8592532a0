//! HTTP binding of the agent façade.
//!
//! `POST /v1/call` takes a JSON [`Call`] and answers with a JSON [`Reply`]. Call failures are
//! reported in `result` with HTTP 200; only bodies that do not decode as a call get HTTP 400.

use crate::service::AgentService;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use mlagent_schema::{Call, Reply, errno};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub struct AgentState {
    pub service: Arc<AgentService>,
}

impl AgentState {
    pub fn new(service: Arc<AgentService>) -> Self {
        Self { service }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn health() -> &'static str {
    "ok"
}

async fn call(State(state): State<AgentState>, body: Bytes) -> (StatusCode, Json<Reply>) {
    match serde_json::from_slice::<Call>(&body) {
        Ok(call) => (StatusCode::OK, Json(state.service.call(call).await)),
        Err(e) => {
            warn!(error = %e, "call body rejected");
            (StatusCode::BAD_REQUEST, Json(Reply::error(errno::EINVAL)))
        }
    }
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let resp = next.run(req).await;

    let status = resp.status();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let path = uri.path();

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {} | {}ms",
            status.as_u16(),
            request_id,
            method.as_str(),
            path,
            latency_ms
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {} | {}ms",
            status.as_u16(),
            request_id,
            method.as_str(),
            path,
            latency_ms
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {} | {}ms",
            status.as_u16(),
            request_id,
            method.as_str(),
            path,
            latency_ms
        );
    }

    resp
}

pub fn agent_router(state: AgentState) -> Router {
    Router::new()
        .route("/v1/call", post(call))
        .route("/v1/health", get(health))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
