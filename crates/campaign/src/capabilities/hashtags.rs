//! Hashtag synthesis from the theme and research gathered so far

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::Capability;
use crate::{
    brain::{LLMClient, ProviderError},
    workflow::types::{CampaignState, CampaignUpdate, CapabilityKind, Message},
};

const MAX_SEARCH_TERMS: usize = 10;
const TITLES_PER_SET: usize = 3;

pub struct HashtagGenerator {
    llm: LLMClient,
}

impl HashtagGenerator {
    pub fn new(llm: LLMClient) -> Self {
        Self { llm }
    }

    fn prompt(state: &CampaignState) -> String {
        let mut search_terms: Vec<&str> = Vec::new();
        for set in &state.search_results {
            search_terms.push(&set.term);
            search_terms.extend(set.results.iter().take(TITLES_PER_SET).map(|r| r.title.as_str()));
        }
        search_terms.truncate(MAX_SEARCH_TERMS);

        format!(
            "Generate 5 relevant and trending hashtags for a campaign:\n\
             Campaign Theme: {}\n\
             Trend Keywords: {}\n\
             Search Terms: {}\n\
             Hashtags should be:\n\
             1. Memorable and catchy\n\
             2. Relevant to the theme\n\
             3. Likely to trend\n\
             4. Mix of broad and specific\n\
             5. Not overused\n\
             Return a JSON object with a 'hashtags' list of strings.",
            state.campaign_theme,
            state.trend_keywords().join(", "),
            search_terms.join(", ")
        )
    }

    async fn generate(&self, state: &CampaignState) -> Result<Vec<String>, ProviderError> {
        let value = self
            .llm
            .complete_json("You are a social media strategist.", &Self::prompt(state))
            .await?;

        match value.get("hashtags") {
            Some(Value::Array(items)) => Ok(items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(normalize_hashtag)
                .collect()),
            _ => Err(ProviderError::ParseError(
                "response carried no hashtags list".to_string(),
            )),
        }
    }
}

/// Exactly one leading '#'; blank tags are dropped
pub fn normalize_hashtag(raw: &str) -> Option<String> {
    let body = raw.trim().trim_start_matches('#').trim();
    if body.is_empty() {
        None
    } else {
        Some(format!("#{}", body))
    }
}

/// Tags derived from the theme alone, used when generation fails
pub fn fallback_hashtags(theme: &str) -> Vec<String> {
    let words: Vec<&str> = theme.split_whitespace().collect();
    match words.first() {
        Some(first) => vec![format!("#{}", words.concat()), format!("#{}Campaign", first)],
        None => vec!["#Campaign".to_string()],
    }
}

#[async_trait]
impl Capability for HashtagGenerator {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::HashtagGenerator
    }

    async fn execute(&self, state: &CampaignState) -> CampaignUpdate {
        let theme = &state.campaign_theme;
        let mut messages = Vec::new();

        let hashtags = match self.generate(state).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!("[HASHTAGS] Generation failed: {}", e);
                messages.push(Message::assistant(format!(
                    "Error generating hashtags: {}. Using basic hashtags.",
                    e
                )));
                fallback_hashtags(theme)
            }
        };

        info!("[HASHTAGS] {} hashtag(s) for '{}'", hashtags.len(), theme);
        messages.push(Message::assistant(format!(
            "Generated hashtags for '{}': {}",
            theme,
            hashtags.join(", ")
        )));

        CampaignUpdate {
            hashtags: Some(hashtags),
            messages,
            ..CampaignUpdate::default()
        }
    }
}
