use crate::services::providers::gemini::{GeminiConfig, GEMINI_API_BASE};
use crate::services::providers::GenerationParams;
use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub generation: GenerationParams,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl From<&GeminiSettings> for GeminiConfig {
    fn from(settings: &GeminiSettings) -> Self {
        GeminiConfig {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base: settings.api_base.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl GeminiSettings {
    pub fn api_key_configured(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

impl RelayConfig {
    /// Load from `.env`, the optional `configuration` file and the process
    /// environment. Fails when no credential is configured.
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GenerationParams::default();

        Ok(RelayConfig {
            common,
            gemini: GeminiSettings {
                api_key: Secret::new(required(&lookup, "GEMINI_API_KEY")?),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_base: lookup("GEMINI_API_BASE")
                    .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
                timeout_secs: parsed(&lookup, "GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            generation: GenerationParams {
                temperature: parsed(&lookup, "GEMINI_TEMPERATURE", defaults.temperature)?,
                top_p: parsed(&lookup, "GEMINI_TOP_P", defaults.top_p)?,
                top_k: parsed(&lookup, "GEMINI_TOP_K", defaults.top_k)?,
                max_output_tokens: parsed(
                    &lookup,
                    "GEMINI_MAX_OUTPUT_TOKENS",
                    defaults.max_output_tokens,
                )?,
            },
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key)))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}
