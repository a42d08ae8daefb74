//! Configuration for the concrete provider adapter.

use crate::error::AgentError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load from environment variables, reading `.env` if present.
    ///
    /// `CONCIERGE_LLM_API_KEY` (falling back to `OPENAI_API_KEY`) is
    /// required; `CONCIERGE_LLM_BASE_URL` and `CONCIERGE_LLM_MODEL` are
    /// optional.
    pub fn from_env() -> Result<Self, AgentError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let api_key = std::env::var("CONCIERGE_LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                AgentError::Configuration("missing CONCIERGE_LLM_API_KEY".to_string())
            })?;

        let base_url = std::env::var("CONCIERGE_LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("CONCIERGE_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}
