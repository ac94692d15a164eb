//! Chat relay: prompt composition, one upstream call, result normalization.

use crate::models::StatusResponse;
use crate::prompt;
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use std::sync::Arc;

/// Fixed prompt used by the health probe.
pub const HEALTH_PROMPT: &str = "test connection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upstream,
    Timeout,
}

/// Outcome of one chat call. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatResult {
    Success { message: String },
    Failure { kind: ErrorKind, detail: String },
}

impl ChatResult {
    fn upstream(err: ProviderError) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::Upstream
        };
        ChatResult::Failure {
            kind,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ChatResult {
    fn into_response(self) -> Response {
        match self {
            ChatResult::Success { message } => {
                (StatusCode::OK, Json(StatusResponse::success(message))).into_response()
            }
            ChatResult::Failure {
                kind: ErrorKind::Validation,
                detail,
            } => AppError::BadRequest(detail).into_response(),
            ChatResult::Failure { detail, .. } => AppError::Upstream(detail).into_response(),
        }
    }
}

/// Immutable relay handle shared by all requests.
#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

impl ChatRelay {
    pub fn new(provider: Arc<dyn TextProvider>, params: GenerationParams) -> Self {
        Self { provider, params }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn chat(&self, message: &str) -> ChatResult {
        if message.is_empty() {
            return ChatResult::Failure {
                kind: ErrorKind::Validation,
                detail: "message must not be empty".to_string(),
            };
        }

        let prompt = prompt::compose(message);

        match self.provider.generate(&prompt, &self.params).await {
            Ok(text) if text.is_empty() => ChatResult::Failure {
                kind: ErrorKind::Upstream,
                detail: "Provider returned an empty response".to_string(),
            },
            Ok(text) => ChatResult::Success { message: text },
            Err(e) => {
                tracing::error!(error = %e, "Error in chat endpoint");
                ChatResult::upstream(e)
            }
        }
    }

    /// Round-trip a trivial prompt to confirm the provider is reachable.
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider
            .generate(HEALTH_PROMPT, &self.params)
            .await
            .map(|_| ())
            .inspect_err(|e| tracing::error!(error = %e, "Error in test endpoint"))
    }
}
