//! One diagnostic run: probe candidates in order, validate the first
//! healthy one with a chat request, stop at the first full success.

use crate::chat::{test_chat_endpoint, ChatProbeResult, SAMPLE_MESSAGE};
use crate::probe::{any_success, check_server};
use crate::target::{ProbeTarget, DEFAULT_PORT};
use crate::transport::HttpTransport;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DiagnosticSettings {
    pub port: u16,
    pub probe_timeout: Duration,
    pub chat_timeout: Duration,
    pub message: String,
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            probe_timeout: Duration::from_secs(5),
            chat_timeout: Duration::from_secs(30),
            message: SAMPLE_MESSAGE.to_string(),
        }
    }
}

/// Terminal value of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticVerdict {
    pub succeeded_host: Option<String>,
    pub chat_probe: Option<ChatProbeResult>,
    pub overall_success: bool,
}

impl DiagnosticVerdict {
    fn failure(chat_probe: Option<ChatProbeResult>) -> Self {
        Self {
            succeeded_host: None,
            chat_probe,
            overall_success: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Probing(usize),
    Validating(usize),
    Verdict,
}

pub struct Diagnostic<T> {
    transport: T,
    settings: DiagnosticSettings,
}

impl<T: HttpTransport> Diagnostic<T> {
    pub fn new(transport: T, settings: DiagnosticSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Walk `hosts` in order and return the verdict.
    ///
    /// Probe failures never end the run early; only console writes can fail.
    pub async fn run<W: Write + Send>(
        &self,
        hosts: &[String],
        out: &mut W,
    ) -> io::Result<DiagnosticVerdict> {
        let mut phase = Phase::Idle;
        let mut verdict = DiagnosticVerdict::failure(None);

        loop {
            phase = match phase {
                Phase::Idle => {
                    writeln!(
                        out,
                        "Checking {} candidate host(s) on port {}",
                        hosts.len(),
                        self.settings.port
                    )?;
                    Phase::Probing(0)
                }
                Phase::Probing(index) => match hosts.get(index) {
                    None => Phase::Verdict,
                    Some(host) => {
                        let target = ProbeTarget::new(host.as_str(), self.settings.port);
                        writeln!(out)?;
                        writeln!(out, "Probing {}", target.base_url())?;

                        let report = check_server(
                            &self.transport,
                            &target,
                            self.settings.probe_timeout,
                            out,
                        )
                        .await?;

                        if any_success(&report) {
                            Phase::Validating(index)
                        } else {
                            tracing::debug!(host = %host, "No healthy path");
                            Phase::Probing(index + 1)
                        }
                    }
                },
                Phase::Validating(index) => {
                    let host = &hosts[index];
                    let target = ProbeTarget::new(host.as_str(), self.settings.port);
                    writeln!(out, "Server reachable on {}, testing chat", host)?;

                    let chat = test_chat_endpoint(
                        &self.transport,
                        &target,
                        &self.settings.message,
                        self.settings.chat_timeout,
                        out,
                    )
                    .await?;

                    if chat.success {
                        verdict = DiagnosticVerdict {
                            succeeded_host: Some(host.clone()),
                            chat_probe: Some(chat),
                            overall_success: true,
                        };
                        Phase::Verdict
                    } else {
                        tracing::debug!(host = %host, "Chat probe failed, moving on");
                        verdict = DiagnosticVerdict::failure(Some(chat));
                        Phase::Probing(index + 1)
                    }
                }
                Phase::Verdict => return Ok(verdict),
            };
        }
    }
}
