//! Final banners and client configuration hints.

use crate::diagnostic::DiagnosticVerdict;
use crate::target::ProbeTarget;
use std::io::{self, Write};

const RULE: &str = "==================================================";

/// Base URLs a mobile client should use, per deployment context.
pub fn recommendations(port: u16, local_ip: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Android emulator", format!("http://10.0.2.2:{}", port)),
        ("iOS simulator", format!("http://localhost:{}", port)),
        (
            "Physical device",
            ProbeTarget::new(local_ip, port).base_url(),
        ),
    ]
}

/// Opening lines of a run, before any host is probed.
pub fn print_header<W: Write>(out: &mut W, local_ip: &str) -> io::Result<()> {
    writeln!(out, "Plant care relay health check")?;
    writeln!(out, "Your local IP address is: {}", local_ip)
}

pub fn print_verdict<W: Write>(
    out: &mut W,
    verdict: &DiagnosticVerdict,
    port: u16,
    local_ip: &str,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;

    match &verdict.succeeded_host {
        Some(host) if verdict.overall_success => {
            writeln!(out, "Server is working correctly on {}", host)?;
            writeln!(out, "Use this URL: {}", ProbeTarget::new(host.as_str(), port).base_url())?;
            writeln!(out)?;
            writeln!(out, "Recommended client configuration:")?;
            for (context, url) in recommendations(port, local_ip) {
                writeln!(out, "  {:<17} {}", format!("{}:", context), url)?;
            }
        }
        _ => {
            writeln!(out, "Could not find a working server")?;
            if let Some(chat) = &verdict.chat_probe {
                if let Some(error) = &chat.error {
                    writeln!(out, "Last chat attempt failed: {}", error)?;
                }
            }
            writeln!(out)?;
            writeln!(out, "Next steps:")?;
            writeln!(out, "  1. Make sure the relay is running (plantcare-service)")?;
            writeln!(out, "  2. Check that GEMINI_API_KEY is set and valid")?;
            writeln!(out, "  3. Check that port {} is not blocked by a firewall", port)?;
            writeln!(out, "  4. Look at the relay's logs for request errors")?;
        }
    }

    writeln!(out, "{}", RULE)
}
