//! Web search over the trend keywords (or the theme)

use std::time::Duration;

use async_trait::async_trait;
use services::services::WebSearchProvider;
use tracing::{info, warn};

use super::{pace, Capability};
use crate::workflow::types::{
    CampaignState, CampaignUpdate, CapabilityKind, Message, SearchHit, SearchResultSet,
};

pub const MISSING_KEY_MESSAGE: &str = "TAVILY_API_KEY not set. Cannot perform search.";

const RESULTS_PER_TERM: u32 = 5;

pub struct SearchEngine {
    provider: Option<WebSearchProvider>,
    delay: Duration,
}

impl SearchEngine {
    pub fn new(provider: Option<WebSearchProvider>) -> Self {
        Self {
            provider,
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Trend keywords when any were recorded, otherwise the theme alone
pub fn search_terms(state: &CampaignState) -> Vec<String> {
    let keywords: Vec<String> = state
        .trend_keywords()
        .into_iter()
        .filter(|k| !k.trim().is_empty())
        .collect();

    if keywords.is_empty() {
        vec![state.campaign_theme.clone()]
    } else {
        keywords
    }
}

#[async_trait]
impl Capability for SearchEngine {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::SearchEngine
    }

    async fn execute(&self, state: &CampaignState) -> CampaignUpdate {
        let Some(provider) = &self.provider else {
            warn!("[SEARCH] {}", MISSING_KEY_MESSAGE);
            return CampaignUpdate {
                search_results: Some(Vec::new()),
                ..CampaignUpdate::default()
            }
            .with_message(Message::assistant(MISSING_KEY_MESSAGE));
        };

        let terms = search_terms(state);
        let mut result_sets = Vec::with_capacity(terms.len());
        let mut messages = Vec::new();

        for (idx, term) in terms.iter().enumerate() {
            if idx > 0 {
                pace(self.delay).await;
            }

            let query = format!("latest information about {}", term);
            match provider.search(&query, Some(RESULTS_PER_TERM)).await {
                Ok(response) => result_sets.push(SearchResultSet {
                    term: term.clone(),
                    results: response
                        .results
                        .into_iter()
                        .map(|r| SearchHit {
                            title: r.title,
                            url: r.url,
                            content: r.snippet,
                            score: r.score,
                        })
                        .collect(),
                    error: None,
                }),
                Err(e) => {
                    warn!("[SEARCH] Search failed for '{}': {}", term, e);
                    result_sets.push(SearchResultSet {
                        term: term.clone(),
                        results: Vec::new(),
                        error: Some(e.to_string()),
                    });
                    messages.push(Message::assistant(format!(
                        "Error searching for '{}': {}",
                        term, e
                    )));
                }
            }
        }

        info!("[SEARCH] Collected {} result set(s)", result_sets.len());
        messages.push(Message::assistant(format!(
            "Gathered information on {} with {} result sets.",
            terms.join(", "),
            result_sets.len()
        )));

        CampaignUpdate {
            search_results: Some(result_sets),
            messages,
            ..CampaignUpdate::default()
        }
    }
}
