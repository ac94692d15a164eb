//! Upstream provider abstraction.
//!
//! The relay talks to the generative language API only through
//! [`TextProvider`], so the Gemini adapter and the mock are interchangeable.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single upstream call. The `Display` text is what callers
/// see as `detail`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request to provider timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Response blocked by provider: {0}")]
    Blocked(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }
}

/// Sampling parameters applied identically to every upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: f32,

    /// Nucleus sampling threshold.
    pub top_p: f32,

    /// Number of candidate tokens considered at each step.
    pub top_k: u32,

    /// Maximum output tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

/// Single-shot text generation.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send `prompt` upstream once and return the generated text verbatim.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    /// Model identifier reported by `/debug`.
    fn model(&self) -> &str;
}
