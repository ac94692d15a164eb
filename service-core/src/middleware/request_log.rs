//! Request logging stage.
//!
//! Wraps every route. For each inbound call it snapshots the request, runs
//! the downstream handler, and hands exactly one [`RequestLogEntry`] to the
//! configured [`RequestLogSink`]. A panic in the handler is turned into a
//! `500 {detail}` response, so every call ends with a well-formed reply and
//! the recorded status always equals the returned one.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::Serialize;

use super::request_id::RequestId;
use crate::error::{ErrorDetail, detail_response};

/// What the log keeps of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySnapshot {
    /// The body decoded as UTF-8.
    Text(String),
    /// Byte length of a body that is not valid UTF-8.
    Bytes(usize),
}

impl BodySnapshot {
    /// `None` for an empty body.
    pub fn capture(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(match std::str::from_utf8(bytes) {
            Ok(text) => BodySnapshot::Text(text.to_string()),
            Err(_) => BodySnapshot::Bytes(bytes.len()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySnapshot>,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only destination for request log entries.
pub trait RequestLogSink: Send + Sync {
    fn record(&self, entry: RequestLogEntry);
}

/// Emits each entry as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl RequestLogSink for TracingSink {
    fn record(&self, entry: RequestLogEntry) {
        let body = entry.body.as_ref().map(|b| match b {
            BodySnapshot::Text(text) => text.clone(),
            BodySnapshot::Bytes(len) => format!("<{} bytes>", len),
        });

        if entry.status >= 500 {
            tracing::error!(
                timestamp = %entry.timestamp,
                request_id = entry.request_id.as_deref(),
                method = %entry.method,
                url = %entry.url,
                body = body.as_deref(),
                status = entry.status,
                error = entry.error.as_deref(),
                "Request failed"
            );
        } else if entry.status >= 400 {
            tracing::warn!(
                timestamp = %entry.timestamp,
                request_id = entry.request_id.as_deref(),
                method = %entry.method,
                url = %entry.url,
                body = body.as_deref(),
                status = entry.status,
                error = entry.error.as_deref(),
                "Request rejected"
            );
        } else {
            tracing::info!(
                timestamp = %entry.timestamp,
                request_id = entry.request_id.as_deref(),
                method = %entry.method,
                url = %entry.url,
                body = body.as_deref(),
                status = entry.status,
                "Request completed"
            );
        }
    }
}

/// Keeps entries in memory. Used by tests to inspect what was logged.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<RequestLogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<RequestLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl RequestLogSink for MemorySink {
    fn record(&self, entry: RequestLogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// State for [`request_log_middleware`].
#[derive(Clone)]
pub struct RequestLog {
    sink: Arc<dyn RequestLogSink>,
}

impl RequestLog {
    pub fn new(sink: Arc<dyn RequestLogSink>) -> Self {
        Self { sink }
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

fn full_url(req: &Request) -> String {
    let uri = req.uri();
    if uri.authority().is_some() {
        return uri.to_string();
    }
    match req.headers().get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, uri),
        None => uri.to_string(),
    }
}

/// Largest body buffered for logging, matching axum's default body limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn content_length(parts: &axum::http::request::Parts) -> Option<usize> {
    parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Internal server error".to_string()
    }
}

pub async fn request_log_middleware(
    State(log): State<RequestLog>,
    req: Request,
    next: Next,
) -> Response {
    let timestamp = Utc::now();
    let method = req.method().to_string();
    let url = full_url(&req);
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0.clone());

    let (parts, body) = req.into_parts();
    let (body, response) = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => {
            let bytes = collected.to_bytes();
            let snapshot = BodySnapshot::capture(&bytes);

            tracing::info!(method = %method, url = %url, body = ?snapshot, "Request received");

            let req = Request::from_parts(parts, Body::from(bytes));
            let response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
                Ok(response) => response,
                Err(payload) => detail_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    panic_message(payload.as_ref()),
                ),
            };
            (snapshot, response)
        }
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            let len = content_length(&parts).unwrap_or(MAX_BODY_BYTES);
            (
                Some(BodySnapshot::Bytes(len)),
                detail_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body exceeds {} bytes", MAX_BODY_BYTES),
                ),
            )
        }
        Err(e) => (
            None,
            detail_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to read request body: {}", e),
            ),
        ),
    };

    log.sink.record(RequestLogEntry {
        timestamp,
        request_id,
        method,
        url,
        body,
        status: response.status().as_u16(),
        error: response
            .extensions()
            .get::<ErrorDetail>()
            .map(|detail| detail.0.clone()),
    });

    response
}
