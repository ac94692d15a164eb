//! Reachability probes against the relay's health paths.

use crate::target::ProbeTarget;
use crate::transport::{HttpReply, HttpTransport, ProbeError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// Paths probed on every candidate host, in order.
pub const PROBE_PATHS: [&str; 2] = ["/", "/test"];

/// Status code a healthy relay answers with.
pub const EXPECTED_STATUS: u16 = 200;

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Http(u16),
    Timeout,
    ConnectionError,
    Error(String),
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Http(code) => write!(f, "{}", code),
            ProbeStatus::Timeout => f.write_str("timeout"),
            ProbeStatus::ConnectionError => f.write_str("connection_error"),
            ProbeStatus::Error(_) => f.write_str("error"),
        }
    }
}

impl From<&ProbeError> for ProbeStatus {
    fn from(err: &ProbeError) -> Self {
        match err {
            ProbeError::Timeout => ProbeStatus::Timeout,
            ProbeError::ConnectionError(_) => ProbeStatus::ConnectionError,
            ProbeError::Other(message) => ProbeStatus::Error(message.clone()),
        }
    }
}

/// `{status, message}` body shared by the health and chat paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusBody {
    pub status: String,
    pub message: String,
}

impl StatusBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

/// Result of probing one path on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: ProbeStatus,
    pub success: bool,
    pub body: Option<StatusBody>,
}

impl ProbeOutcome {
    pub fn from_reply(reply: &HttpReply) -> Self {
        let body = StatusBody::parse(&reply.body);
        Self {
            status: ProbeStatus::Http(reply.status),
            success: reply.status == EXPECTED_STATUS && body.is_some(),
            body,
        }
    }

    pub fn from_error(err: &ProbeError) -> Self {
        Self {
            status: ProbeStatus::from(err),
            success: false,
            body: None,
        }
    }
}

/// Outcomes keyed by full URL.
pub type ProbeReport = BTreeMap<String, ProbeOutcome>;

pub fn any_success(report: &ProbeReport) -> bool {
    report.values().any(|outcome| outcome.success)
}

/// Probe every health path on `target`, printing progress to `out`.
///
/// Probe failures are recorded, never returned; only console writes can fail.
pub async fn check_server<T, W>(
    transport: &T,
    target: &ProbeTarget,
    timeout: Duration,
    out: &mut W,
) -> io::Result<ProbeReport>
where
    T: HttpTransport + ?Sized,
    W: Write + Send,
{
    let mut report = ProbeReport::new();

    for path in PROBE_PATHS {
        let url = target.url(path);
        writeln!(out, "  GET {}", url)?;

        let outcome = match transport.get(&url, timeout).await {
            Ok(reply) => ProbeOutcome::from_reply(&reply),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "Probe failed");
                ProbeOutcome::from_error(&err)
            }
        };

        match (&outcome.status, &outcome.body) {
            (ProbeStatus::Http(code), Some(body)) => {
                writeln!(out, "    -> {} {}: {}", code, body.status, body.message)?
            }
            (ProbeStatus::Http(code), None) => {
                writeln!(out, "    -> {} (unexpected response body)", code)?
            }
            (ProbeStatus::Error(message), _) => writeln!(out, "    -> error: {}", message)?,
            (status, _) => writeln!(out, "    -> {}", status)?,
        }

        report.insert(url, outcome);
    }

    Ok(report)
}
