use crate::models::DebugInfo;
use crate::startup::AppState;
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderName},
    Json,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;

const REDACTED: &str = "<redacted>";

fn is_sensitive(name: &HeaderName) -> bool {
    *name == header::AUTHORIZATION
        || *name == header::COOKIE
        || *name == header::PROXY_AUTHORIZATION
        || name.as_str() == "x-goog-api-key"
}

fn header_snapshot(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut snapshot = BTreeMap::new();
    for (name, value) in headers {
        let value = if is_sensitive(name) {
            REDACTED.to_string()
        } else {
            value.to_str().unwrap_or("<binary>").to_string()
        };
        snapshot
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    snapshot
}

/// `GET /debug`: echo caller metadata and static server facts.
pub async fn debug(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<DebugInfo> {
    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Json(DebugInfo {
        client_ip,
        request_headers: header_snapshot(&headers),
        server_info: state.server_info.clone(),
    })
}
