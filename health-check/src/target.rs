use std::net::{IpAddr, Ipv4Addr, UdpSocket};

pub const DEFAULT_PORT: u16 = 8000;

/// Hosts every run tries, in order. The detected interface address is
/// inserted before the wildcard.
const LOOPBACK_NAME: &str = "localhost";
const LOOPBACK_LITERAL: &str = "127.0.0.1";
const WILDCARD: &str = "0.0.0.0";

/// One address the relay might be listening on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Full URL for `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

/// Candidate hosts in probe order, without duplicates.
///
/// An explicitly supplied host is tried first.
pub fn candidate_hosts(local_ip: &str, extra: Option<&str>) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    let ordered = extra
        .into_iter()
        .chain([LOOPBACK_NAME, LOOPBACK_LITERAL, local_ip, WILDCARD]);

    for host in ordered {
        let host = host.trim();
        if !host.is_empty() && !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_string());
        }
    }
    hosts
}

/// Address of the interface used for outbound traffic.
///
/// Connecting a UDP socket sends nothing; it only selects a route. Any
/// failure falls back to the loopback literal.
pub fn detect_local_ip() -> IpAddr {
    let fallback = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let detect = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(("10.255.255.255", 1))?;
        Ok(socket.local_addr()?.ip())
    };

    match detect() {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => fallback,
        Err(e) => {
            tracing::debug!(error = %e, "Local IP detection failed, using loopback");
            fallback
        }
    }
}
