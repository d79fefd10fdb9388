use std::sync::Arc;

use serde::{Deserialize, Serialize};

// Provider abstraction layer
pub mod providers;
pub use providers::{
    ChatConfig, ChatMessage, ChatRequest, LLMProviderTrait, OpenAIProvider, ProviderError,
    ProviderResponse, ProviderType, TokenUsage,
};

/// Configuration for the campaign language model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMConfig {
    pub provider: ProviderType,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::OpenAI,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 1500,
            endpoint: None,
        }
    }
}

/// Thin wrapper around the configured LLM provider
///
/// Holds no mutable state, so one client is shared by every run.
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    provider: Arc<dyn LLMProviderTrait>,
}

impl std::fmt::Debug for LLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMClient")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl LLMClient {
    pub fn new(config: LLMConfig, api_key: Option<String>) -> Self {
        let provider = match config.provider {
            ProviderType::OpenAI => OpenAIProvider::new(api_key),
            ProviderType::Ollama => OpenAIProvider::ollama(),
        };
        let provider = match &config.endpoint {
            Some(endpoint) => provider.with_endpoint(endpoint.clone()),
            None => provider,
        };

        Self::with_provider(config, Arc::new(provider))
    }

    /// Build a client around an already constructed provider
    pub fn with_provider(config: LLMConfig, provider: Arc<dyn LLMProviderTrait>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    fn chat_config(&self, json_mode: bool) -> ChatConfig {
        let model = if self.config.model.trim().is_empty() {
            self.provider.default_model().to_string()
        } else {
            self.config.model.clone()
        };

        ChatConfig {
            model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            json_mode,
        }
    }

    /// Send a system + user prompt pair and return the raw completion text
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            config: self.chat_config(json_mode),
        };

        let response = self.provider.chat(request).await?;
        Ok(response.content)
    }

    /// Ask for a JSON object and parse it
    ///
    /// Markdown code fences around the body are tolerated; anything that is
    /// not a JSON object is a parse error.
    pub async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value, ProviderError> {
        let raw = self.complete(system_prompt, user_prompt, true).await?;
        parse_json_object(&raw)
    }
}

/// Strip a surrounding ```json ... ``` (or bare ```) fence
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_json_object(raw: &str) -> Result<serde_json::Value, ProviderError> {
    let body = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("invalid JSON from model: {}", e)))?;

    if !value.is_object() {
        return Err(ProviderError::ParseError(
            "model response is not a JSON object".to_string(),
        ));
    }
    Ok(value)
}
