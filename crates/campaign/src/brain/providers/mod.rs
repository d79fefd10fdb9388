//! LLM provider abstraction layer
//!
//! Providers sit behind `LLMProviderTrait` so the planner and the synthesis
//! capabilities can run against a hosted model, a local Ollama server, or a
//! scripted provider in tests.

mod openai;
mod provider_trait;

pub use openai::OpenAIProvider;
pub use provider_trait::{
    ChatConfig, ChatMessage, ChatRequest, LLMProviderTrait, MessageRole, ProviderError,
    ProviderResponse, ProviderType, TokenUsage,
};
