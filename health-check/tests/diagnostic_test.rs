//! Diagnostic runs against a scripted transport.
//!
//! Each host is given a fixed behaviour; every request is recorded so the
//! tests can check exactly which URLs were hit, in what order.

use async_trait::async_trait;
use health_check::probe::ProbeStatus;
use health_check::{
    Diagnostic, DiagnosticSettings, DiagnosticVerdict, HttpReply, HttpTransport, ProbeError,
    DEFAULT_PORT,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum HostScript {
    Hang,
    Healthy { chat: ChatScript },
    /// 200 on `/` only, `/test` fails upstream.
    RootOnly { chat: ChatScript },
    /// Answers 200 with a body that is not the relay's shape.
    NotTheRelay,
}

#[derive(Clone)]
enum ChatScript {
    Reply(&'static str),
    Fail(&'static str),
}

#[derive(Default)]
struct ScriptedTransport {
    hosts: HashMap<String, HostScript>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn with(mut self, host: &str, script: HostScript) -> Self {
        self.hosts.insert(host.to_string(), script);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn chat_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("POST"))
            .collect()
    }

    fn script_for(&self, url: &str) -> (Option<HostScript>, String) {
        let rest = url.trim_start_matches("http://");
        let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
        let host = authority
            .rsplit_once(':')
            .map(|(h, _)| h)
            .unwrap_or(authority);
        (self.hosts.get(host).cloned(), path.to_string())
    }
}

fn ok(body: serde_json::Value) -> Result<HttpReply, ProbeError> {
    Ok(HttpReply {
        status: 200,
        body: body.to_string(),
    })
}

fn detail(status: u16, message: &str) -> Result<HttpReply, ProbeError> {
    Ok(HttpReply {
        status,
        body: serde_json::json!({ "detail": message }).to_string(),
    })
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpReply, ProbeError> {
        self.calls.lock().unwrap().push(format!("GET {}", url));

        match self.script_for(url) {
            (None, _) => {
                Err(ProbeError::ConnectionError("connection refused".into()))
            }
            (Some(HostScript::Hang), _) => Err(ProbeError::Timeout),
            (Some(HostScript::NotTheRelay), _) => Ok(HttpReply {
                status: 200,
                body: "<html>router admin</html>".to_string(),
            }),
            (Some(HostScript::RootOnly { .. }), path) if path == "/test" => {
                detail(500, "API key not valid")
            }
            (Some(_), path) if path == "/" => ok(serde_json::json!({
                "status": "ok",
                "message": "Plant Care Assistant API is running"
            })),
            (Some(_), _) => ok(serde_json::json!({
                "status": "success",
                "message": "Connection successful"
            })),
        }
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        _timeout: Duration,
    ) -> Result<HttpReply, ProbeError> {
        self.calls.lock().unwrap().push(format!("POST {}", url));
        assert!(body["message"].is_string());

        match self.script_for(url).0 {
            Some(HostScript::Healthy { chat }) | Some(HostScript::RootOnly { chat }) => match chat
            {
                ChatScript::Reply(text) => ok(serde_json::json!({
                    "status": "success",
                    "message": text
                })),
                ChatScript::Fail(message) => detail(500, message),
            },
            _ => Err(ProbeError::ConnectionError("connection refused".into())),
        }
    }
}

fn hosts() -> Vec<String> {
    ["localhost", "127.0.0.1", "192.168.1.20", "0.0.0.0"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

struct Run {
    verdict: DiagnosticVerdict,
    transport: Arc<ScriptedTransport>,
    output: String,
}

async fn run(transport: ScriptedTransport) -> Run {
    let transport = Arc::new(transport);
    let diagnostic = Diagnostic::new(transport.clone(), DiagnosticSettings::default());
    let mut out = Vec::new();
    let verdict = diagnostic.run(&hosts(), &mut out).await.unwrap();
    Run {
        verdict,
        transport,
        output: String::from_utf8(out).unwrap(),
    }
}

fn url(host: &str, path: &str) -> String {
    format!("http://{}:{}{}", host, DEFAULT_PORT, path)
}

#[tokio::test]
async fn only_loopback_literal_reachable_selects_it_and_chats_once() {
    let run = run(ScriptedTransport::default().with(
        "127.0.0.1",
        HostScript::Healthy {
            chat: ChatScript::Reply("Tomatoes need six to eight hours of sun."),
        },
    ))
    .await;

    assert!(run.verdict.overall_success);
    assert_eq!(run.verdict.succeeded_host.as_deref(), Some("127.0.0.1"));
    assert_eq!(
        run.transport.chat_calls(),
        vec![format!("POST {}", url("127.0.0.1", "/chat"))]
    );

    // Later candidates are never touched once a host passes.
    assert!(run
        .transport
        .calls()
        .iter()
        .all(|c| !c.contains("192.168.1.20") && !c.contains("0.0.0.0")));

    let chat = run.verdict.chat_probe.unwrap();
    assert_eq!(chat.status, ProbeStatus::Http(200));
    assert_eq!(
        chat.response.unwrap().message,
        "Tomatoes need six to eight hours of sun."
    );
    assert!(run.output.contains("Probing http://localhost:8000"));
}

#[tokio::test]
async fn nothing_reachable_fails_without_chat_probe() {
    let run = run(ScriptedTransport::default().with("localhost", HostScript::Hang)).await;

    assert!(!run.verdict.overall_success);
    assert!(run.verdict.succeeded_host.is_none());
    assert!(run.verdict.chat_probe.is_none());
    assert!(run.transport.chat_calls().is_empty());

    // Both paths on all four hosts.
    assert_eq!(run.transport.calls().len(), 8);
    assert!(run.output.contains("timeout"));
    assert!(run.output.contains("connection_error"));
}

#[tokio::test]
async fn every_path_of_a_host_is_probed_before_deciding() {
    let run = run(ScriptedTransport::default().with(
        "localhost",
        HostScript::Healthy {
            chat: ChatScript::Reply("ok"),
        },
    ))
    .await;

    assert_eq!(
        run.transport.calls(),
        vec![
            format!("GET {}", url("localhost", "/")),
            format!("GET {}", url("localhost", "/test")),
            format!("POST {}", url("localhost", "/chat")),
        ]
    );
}

#[tokio::test]
async fn one_healthy_path_is_enough_to_validate() {
    let run = run(ScriptedTransport::default().with(
        "localhost",
        HostScript::RootOnly {
            chat: ChatScript::Reply("Water when the top inch is dry."),
        },
    ))
    .await;

    assert!(run.verdict.overall_success);
    assert_eq!(run.verdict.succeeded_host.as_deref(), Some("localhost"));
}

#[tokio::test]
async fn failed_chat_resumes_at_next_host() {
    let run = run(
        ScriptedTransport::default()
            .with(
                "localhost",
                HostScript::RootOnly {
                    chat: ChatScript::Fail("API key not valid"),
                },
            )
            .with(
                "192.168.1.20",
                HostScript::Healthy {
                    chat: ChatScript::Reply("Use well-draining soil."),
                },
            ),
    )
    .await;

    assert!(run.verdict.overall_success);
    assert_eq!(run.verdict.succeeded_host.as_deref(), Some("192.168.1.20"));
    assert_eq!(
        run.transport.chat_calls(),
        vec![
            format!("POST {}", url("localhost", "/chat")),
            format!("POST {}", url("192.168.1.20", "/chat")),
        ]
    );
    assert!(run.output.contains("API key not valid"));
}

#[tokio::test]
async fn chat_failure_everywhere_is_a_failed_verdict() {
    let run = run(ScriptedTransport::default().with(
        "127.0.0.1",
        HostScript::Healthy {
            chat: ChatScript::Fail("Resource has been exhausted"),
        },
    ))
    .await;

    assert!(!run.verdict.overall_success);
    assert!(run.verdict.succeeded_host.is_none());

    let chat = run.verdict.chat_probe.unwrap();
    assert!(!chat.success);
    assert_eq!(chat.status, ProbeStatus::Http(500));
    assert_eq!(chat.error.as_deref(), Some("Resource has been exhausted"));
}

#[tokio::test]
async fn non_relay_200_does_not_count_as_healthy() {
    let run = run(ScriptedTransport::default().with("localhost", HostScript::NotTheRelay)).await;

    assert!(!run.verdict.overall_success);
    assert!(run.transport.chat_calls().is_empty());
}
