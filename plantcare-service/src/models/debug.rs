use serde::Serialize;
use std::collections::BTreeMap;

/// Body of `GET /debug`.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub client_ip: String,
    pub request_headers: BTreeMap<String, String>,
    pub server_info: ServerInfo,
}

/// Static facts about the running relay. Never carries the credential itself.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub service: String,
    pub version: String,
    pub model: String,
    pub api_key_configured: bool,
}
