//! Campaign script synthesis

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::Capability;
use crate::{
    brain::{LLMClient, ProviderError},
    workflow::types::{CampaignState, CampaignUpdate, CapabilityKind, Message},
};

pub struct ScriptGenerator {
    llm: LLMClient,
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

impl ScriptGenerator {
    pub fn new(llm: LLMClient) -> Self {
        Self { llm }
    }

    fn prompt(state: &CampaignState) -> String {
        let search_terms: Vec<String> = state.search_results.iter().map(|s| s.term.clone()).collect();

        format!(
            "Create an engaging {}-second campaign script:\n\
             Campaign Theme: {}\n\
             Target Audience: {}\n\
             Tone: {}\n\
             Trends: {}\n\
             Search Insights: {}\n\
             Hashtags: {}\n\
             Include:\n\
             1. Engaging hook\n\
             2. Persuasive messaging aligned with theme\n\
             3. Strong call to action\n\
             4. Tone suitable for audience\n\
             5. Timing for duration\n\
             Also provide 2 production ideas (e.g., visuals, settings).\n\
             Return JSON with 'script' (string) and 'production_ideas' (list of strings).",
            state.duration_seconds,
            state.campaign_theme,
            state.target_audience,
            state.tone,
            list_or_none(&state.trend_keywords()),
            list_or_none(&search_terms),
            list_or_none(&state.hashtags),
        )
    }

    async fn generate(&self, state: &CampaignState) -> Result<(String, Vec<String>), ProviderError> {
        let value = self
            .llm
            .complete_json("You are an award-winning advertising copywriter.", &Self::prompt(state))
            .await?;

        let script = value
            .get("script")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if script.is_empty() {
            return Err(ProviderError::ParseError("Empty script generated".to_string()));
        }

        let production_ideas = match value.get("production_ideas") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(idea)) if !idea.trim().is_empty() => vec![idea.trim().to_string()],
            _ => Vec::new(),
        };

        Ok((script.to_string(), production_ideas))
    }
}

#[async_trait]
impl Capability for ScriptGenerator {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::ScriptGenerator
    }

    async fn execute(&self, state: &CampaignState) -> CampaignUpdate {
        let theme = &state.campaign_theme;
        let mut messages = Vec::new();

        let (script, production_ideas) = match self.generate(state).await {
            Ok(generated) => generated,
            Err(e) => {
                warn!("[SCRIPT] Generation failed: {}", e);
                messages.push(Message::assistant(format!(
                    "Error generating script: {}. Using fallback script.",
                    e
                )));
                (
                    format!("Script for {} campaign (fallback due to error).", theme),
                    vec!["Use vibrant visuals".to_string()],
                )
            }
        };

        info!("[SCRIPT] {} chars, {} production idea(s)", script.len(), production_ideas.len());
        messages.push(Message::assistant(format!(
            "Generated a {} script for '{}' campaign.",
            state.tone, theme
        )));

        CampaignUpdate {
            script: Some(script),
            production_ideas: Some(production_ideas),
            messages,
            ..CampaignUpdate::default()
        }
    }
}
