use crate::models::ChatRequest;
use crate::services::ChatResult;
use crate::startup::AppState;
use axum::extract::State;
use service_core::extract::ValidatedJson;

/// `POST /chat`: compose, forward once, normalize.
pub async fn chat(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> ChatResult {
    tracing::info!(message_len = req.message.len(), "Chat request received");

    let result = state.relay.chat(&req.message).await;

    if let ChatResult::Success { message } = &result {
        tracing::info!(response_len = message.len(), "Chat response generated");
    }

    result
}
