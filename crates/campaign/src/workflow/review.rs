//! Optional post-plan review: asks whether known steps are still missing

use async_trait::async_trait;
use serde_json::Value;

use super::{
    planner::step_tag,
    types::{CampaignState, StepKind},
};
use crate::brain::{LLMClient, ProviderError};

/// Consulted once when the plan is exhausted
#[async_trait]
pub trait CompletionReview: Send + Sync {
    /// Steps to append; an empty list means the run is complete
    async fn review(&self, state: &CampaignState) -> Result<Vec<StepKind>, ProviderError>;
}

/// Completion review backed by the campaign language model
pub struct LlmCompletionReview {
    llm: LLMClient,
}

impl LlmCompletionReview {
    pub fn new(llm: LLMClient) -> Self {
        Self { llm }
    }

    fn prompt(state: &CampaignState) -> String {
        let executed: Vec<&str> = state
            .plan
            .steps()
            .iter()
            .filter(|s| s.executed)
            .map(|s| s.name.as_str())
            .collect();

        format!(
            "Current state:\n\
             Campaign Theme: {}\n\
             Target Audience: {}\n\
             Tone: {}\n\
             Steps Executed: {}\n\
             Trends: {} found\n\
             Search Results: {} sets\n\
             Hashtags: {} generated\n\
             Script: {}\n\
             User Input: {}\n\
             All planned steps are executed. Decide whether the request needs any tool that has not run.\n\
             Available tools: trend_analyzer, search_engine, hashtag_generator, script_generator.\n\
             Return a JSON object with a 'new_steps' list of tool names; use an empty list when the workflow is complete.",
            state.campaign_theme,
            state.target_audience,
            state.tone,
            executed.join(", "),
            state.trends.len(),
            state.search_results.len(),
            state.hashtags.len(),
            if state.script.is_empty() { "not generated" } else { "generated" },
            state.first_user_message().unwrap_or_default(),
        )
    }
}

#[async_trait]
impl CompletionReview for LlmCompletionReview {
    async fn review(&self, state: &CampaignState) -> Result<Vec<StepKind>, ProviderError> {
        let value = self
            .llm
            .complete_json(
                "You review marketing campaign workflows and answer with JSON only.",
                &Self::prompt(state),
            )
            .await?;

        let steps = match value.get("new_steps") {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(step_tag)
                .filter_map(StepKind::parse)
                .collect(),
            _ => Vec::new(),
        };
        Ok(steps)
    }
}
