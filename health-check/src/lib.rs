//! health-check: locate a running plant care relay and verify it end to end.
//!
//! Candidate hosts are probed one at a time (`/` and `/test`). The first
//! host with a healthy probe gets a real chat request; the first host whose
//! chat request succeeds ends the run.
pub mod chat;
pub mod diagnostic;
pub mod probe;
pub mod report;
pub mod target;
pub mod transport;

pub use diagnostic::{Diagnostic, DiagnosticSettings, DiagnosticVerdict};
pub use target::{candidate_hosts, detect_local_ip, ProbeTarget, DEFAULT_PORT};
pub use transport::{HttpReply, HttpTransport, ProbeError, ReqwestTransport};
