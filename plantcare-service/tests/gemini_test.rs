//! Gemini adapter tests against an in-process fake upstream.
//!
//! The fake picks its behaviour from the model name in the request path,
//! so every scenario goes through the real HTTP client.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use plantcare_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use plantcare_service::services::providers::{GenerationParams, ProviderError, TextProvider};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Captured {
    api_key: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

async fn generate_content(
    State(captured): State<Captured>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    *captured.api_key.lock().unwrap() = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    *captured.body.lock().unwrap() = Some(body);

    let model = call.split(':').next().unwrap_or_default();
    match model {
        "ok-model" => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Water deeply, " }, { "text": "then let it dry." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20 }
        }))
        .into_response(),
        "error-model" => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" }
            })),
        )
            .into_response(),
        "slow-model" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "candidates": [] })).into_response()
        }
        "blocked-model" => Json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .into_response(),
        "garbage-model" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_upstream() -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/v1beta", addr), captured)
}

fn provider(api_base: &str, model: &str, timeout: Duration) -> GeminiTextProvider {
    GeminiTextProvider::new(GeminiConfig {
        api_key: Secret::new("test-api-key".to_string()),
        model: model.to_string(),
        api_base: api_base.to_string(),
        timeout,
    })
    .expect("Failed to create provider")
}

#[tokio::test]
async fn returns_generated_text_verbatim() {
    let (base, captured) = spawn_upstream().await;
    let params = GenerationParams::default();

    let text = provider(&base, "ok-model", Duration::from_secs(5))
        .generate("How do I care for a fern?", &params)
        .await
        .unwrap();

    assert_eq!(text, "Water deeply, then let it dry.");
    assert_eq!(
        captured.api_key.lock().unwrap().as_deref(),
        Some("test-api-key")
    );

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "How do I care for a fern?"
    );
    assert_eq!(body["generationConfig"]["topK"], 40);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
}

#[tokio::test]
async fn provider_error_carries_provider_message() {
    let (base, _) = spawn_upstream().await;

    let err = provider(&base, "error-model", Duration::from_secs(5))
        .generate("hello", &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn slow_upstream_is_classified_as_timeout() {
    let (base, _) = spawn_upstream().await;

    let err = provider(&base, "slow-model", Duration::from_millis(500))
        .generate("hello", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn blocked_prompt_reports_block_reason() {
    let (base, _) = spawn_upstream().await;

    let err = provider(&base, "blocked-model", Duration::from_secs(5))
        .generate("hello", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Blocked(ref reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn non_json_body_is_malformed_response() {
    let (base, _) = spawn_upstream().await;

    let err = provider(&base, "garbage-model", Duration::from_secs(5))
        .generate("hello", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_upstream_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = provider(
        &format!("http://{}/v1beta", addr),
        "ok-model",
        Duration::from_secs(5),
    )
    .generate("hello", &GenerationParams::default())
    .await
    .unwrap_err();

    assert!(matches!(err, ProviderError::NetworkError(_)));
}
