//! OpenAI provider implementation
//!
//! Also serves Ollama, which exposes the same chat-completions surface.

use async_trait::async_trait;
use reqwest::Client;

use super::provider_trait::{
    ChatMessage, ChatRequest, LLMProviderTrait, MessageRole, ProviderError, ProviderResponse,
    ProviderType, TokenUsage,
};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const OLLAMA_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";

/// OpenAI-compatible chat completions provider
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    provider_type: ProviderType,
}

impl OpenAIProvider {
    /// Create a provider for the hosted OpenAI API
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_some() {
            tracing::info!("OpenAI provider initialized with API key");
        } else {
            tracing::warn!("OpenAI provider created without API key - OPENAI_API_KEY not set");
        }

        Self {
            client: Client::new(),
            api_key,
            endpoint: OPENAI_ENDPOINT.to_string(),
            provider_type: ProviderType::OpenAI,
        }
    }

    /// Create a provider for a local Ollama server (no key required)
    pub fn ollama() -> Self {
        tracing::info!("OpenAI-compatible provider initialized for Ollama (local, no API key required)");
        Self {
            client: Client::new(),
            api_key: None,
            endpoint: OLLAMA_ENDPOINT.to_string(),
            provider_type: ProviderType::Ollama,
        }
    }

    /// Override the endpoint (e.g., for Azure OpenAI or local proxies)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn requires_auth(&self) -> bool {
        matches!(self.provider_type, ProviderType::OpenAI)
    }

    /// Convert our ChatMessage to OpenAI API format
    fn message_to_openai(&self, msg: &ChatMessage) -> serde_json::Value {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        serde_json::json!({
            "role": role,
            "content": msg.content
        })
    }

    fn build_payload(&self, request: &ChatRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| self.message_to_openai(m))
            .collect();

        let mut payload = serde_json::json!({
            "model": request.config.model,
            "temperature": request.config.temperature,
            "max_tokens": request.config.max_tokens,
            "messages": messages
        });

        if request.config.json_mode {
            payload["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        payload
    }

    /// Parse OpenAI response into ProviderResponse
    fn parse_response(&self, json: &serde_json::Value) -> Result<ProviderResponse, ProviderError> {
        let message = &json["choices"][0]["message"];
        if message.is_null() {
            return Err(ProviderError::ParseError(
                "response contained no choices".to_string(),
            ));
        }

        let usage = json.get("usage").and_then(|u| {
            Some(TokenUsage {
                input_tokens: u["prompt_tokens"].as_u64()? as u32,
                output_tokens: u["completion_tokens"].as_u64()? as u32,
                total_tokens: u["total_tokens"].as_u64()? as u32,
            })
        });

        let content = message["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(ProviderResponse { content, usage })
    }
}

#[async_trait]
impl LLMProviderTrait for OpenAIProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn name(&self) -> &'static str {
        match self.provider_type {
            ProviderType::OpenAI => "OpenAI",
            ProviderType::Ollama => "Ollama",
        }
    }

    fn is_configured(&self) -> bool {
        !self.requires_auth() || self.api_key.is_some()
    }

    fn default_model(&self) -> &str {
        match self.provider_type {
            ProviderType::OpenAI => "gpt-4o-mini",
            ProviderType::Ollama => "llama3.1",
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ProviderResponse, ProviderError> {
        let auth_header = match (&self.api_key, self.requires_auth()) {
            (Some(key), _) => Some(format!("Bearer {}", key)),
            (None, false) => None,
            (None, true) => {
                return Err(ProviderError::AuthError(
                    "No OpenAI API key configured".to_string(),
                ))
            }
        };

        let payload = self.build_payload(&request);

        tracing::debug!(
            "[{}] Sending request: model={}, messages={}, json_mode={}",
            self.name(),
            request.config.model,
            request.messages.len(),
            request.config.json_mode
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload);
        if let Some(auth_header) = auth_header {
            builder = builder.header("Authorization", auth_header);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                let retry_after_ms = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| secs * 1000);
                return Err(ProviderError::RateLimited { retry_after_ms });
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let parsed = self.parse_response(&json)?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                "[{}] Token usage: input={}, output={}",
                self.name(),
                usage.input_tokens,
                usage.output_tokens
            );
        }
        Ok(parsed)
    }
}
