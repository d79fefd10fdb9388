//! # Campaign
//!
//! Marketing campaign assistant: a planner turns a free-text request into
//! campaign parameters and a step plan, a router walks that plan, and each
//! step is handed to a content capability (trends, web search, hashtags,
//! script, speech).

pub mod brain;
pub mod capabilities;
pub mod config;
pub mod formatter;
pub mod workflow;

#[cfg(test)]
mod router_tests;
#[cfg(test)]
mod test_support;

pub use brain::{LLMClient, LLMConfig, ProviderError, ProviderType};
pub use capabilities::{Capability, CapabilitySet};
pub use config::CampaignConfig;
pub use formatter::format_campaign_output;
pub use workflow::{
    CampaignRequest, CampaignState, CampaignUpdate, CampaignWorkflow, CurrentStep, Message, Plan,
    Router, StepKind,
};

/// Errors surfaced at the campaign boundary
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CampaignError>;
