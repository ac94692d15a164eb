//! Mock provider implementation for testing.

use super::{GenerationParams, ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// What the mock does when asked to generate.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with `Mock response for: <prompt>`.
    Echo,
    /// Reply with fixed text.
    Reply(String),
    /// Fail as if the provider reported an error.
    Fail(String),
    /// Fail as if the upstream call timed out.
    Timeout,
    /// Panic inside the call.
    Panic,
}

/// Mock text provider for testing.
///
/// Every prompt it receives is kept so tests can check what was sent.
pub struct MockTextProvider {
    behavior: MockBehavior,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(message.into()))
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(format!("Mock response for: {}", prompt)),
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Fail(message) => Err(ProviderError::ApiError {
                status: 500,
                message: message.clone(),
            }),
            MockBehavior::Timeout => Err(ProviderError::Timeout(Duration::from_secs(60))),
            MockBehavior::Panic => panic!("mock provider panicked"),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
