//! End-to-end chat validation against a reachable relay.

use crate::probe::{ProbeStatus, StatusBody, EXPECTED_STATUS};
use crate::target::ProbeTarget;
use crate::transport::HttpTransport;
use std::io::{self, Write};
use std::time::{Duration, Instant};

pub const SAMPLE_MESSAGE: &str = "Hello, can you help me with tomato plant care?";

/// Characters of the reply shown on the console.
pub const DISPLAY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatProbeResult {
    pub success: bool,
    pub status: ProbeStatus,
    pub elapsed: Duration,
    pub response: Option<StatusBody>,
    pub error: Option<String>,
}

/// Console copy of `message`, cut at [`DISPLAY_LIMIT`] characters.
pub fn display_copy(message: &str) -> String {
    if message.chars().count() > DISPLAY_LIMIT {
        let cut: String = message.chars().take(DISPLAY_LIMIT).collect();
        format!("{}...", cut)
    } else {
        message.to_string()
    }
}

/// POST `message` to `/chat` on `target` and report what came back.
pub async fn test_chat_endpoint<T, W>(
    transport: &T,
    target: &ProbeTarget,
    message: &str,
    timeout: Duration,
    out: &mut W,
) -> io::Result<ChatProbeResult>
where
    T: HttpTransport + ?Sized,
    W: Write + Send,
{
    let url = target.url("/chat");
    writeln!(out, "  POST {}", url)?;
    writeln!(out, "    message: {:?}", message)?;

    let payload = serde_json::json!({ "message": message });
    let started = Instant::now();
    let reply = transport.post_json(&url, &payload, timeout).await;
    let elapsed = started.elapsed();

    let result = match reply {
        Ok(reply) => {
            let response = StatusBody::parse(&reply.body);
            let success = reply.status == EXPECTED_STATUS && response.is_some();
            let error = if success {
                None
            } else {
                Some(error_detail(&reply.body))
            };
            ChatProbeResult {
                success,
                status: ProbeStatus::Http(reply.status),
                elapsed,
                response,
                error,
            }
        }
        Err(err) => ChatProbeResult {
            success: false,
            status: ProbeStatus::from(&err),
            elapsed,
            response: None,
            error: Some(err.to_string()),
        },
    };

    writeln!(
        out,
        "    -> {} in {:.2}s",
        result.status,
        result.elapsed.as_secs_f64()
    )?;
    if let Some(body) = &result.response {
        writeln!(out, "    reply: {}", display_copy(&body.message))?;
    }
    if let Some(error) = &result.error {
        writeln!(out, "    error: {}", error)?;
    }

    Ok(result)
}

/// The relay's `{detail}` message when present, else the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
