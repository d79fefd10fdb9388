//! Trend lookup: model-suggested keywords scored against live search results

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use services::services::{OrganicResult, TrendLookupClient};
use tracing::{info, warn};

use super::{pace, Capability};
use crate::{
    brain::{LLMClient, ProviderError},
    workflow::types::{
        CampaignState, CampaignUpdate, CapabilityKind, Message, RelatedContent, Trend,
        TrendDirection,
    },
};

pub const MISSING_KEY_MESSAGE: &str = "SERPAPI_KEY not set. Cannot fetch trends.";

const TOP_CONTENT: usize = 3;
const TOP_QUERIES: usize = 3;
const DIRECTION_WINDOW: usize = 5;

pub struct TrendAnalyzer {
    llm: LLMClient,
    client: Option<TrendLookupClient>,
    max_keywords: usize,
    delay: Duration,
}

impl TrendAnalyzer {
    pub fn new(llm: LLMClient, client: Option<TrendLookupClient>) -> Self {
        Self {
            llm,
            client,
            max_keywords: 5,
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn generate_keywords(&self, theme: &str) -> Result<Vec<String>, ProviderError> {
        let prompt = format!(
            "Based on the campaign theme '{}', generate 3-5 relevant keywords or phrases \
             for searching trends. Return a JSON object with a 'keywords' list of strings.",
            theme
        );
        let value = self
            .llm
            .complete_json("You are a social media trend researcher.", &prompt)
            .await?;

        let keywords: Vec<String> = match value.get("keywords") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        if keywords.is_empty() {
            return Err(ProviderError::ParseError(
                "response carried no keywords".to_string(),
            ));
        }
        Ok(keywords)
    }
}

#[async_trait]
impl Capability for TrendAnalyzer {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::TrendAnalyzer
    }

    async fn execute(&self, state: &CampaignState) -> CampaignUpdate {
        let theme = state.campaign_theme.clone();

        let Some(client) = &self.client else {
            warn!("[TRENDS] {}", MISSING_KEY_MESSAGE);
            return CampaignUpdate {
                trends: Some(vec![Trend::failed(theme, "Missing API key")]),
                ..CampaignUpdate::default()
            }
            .with_message(Message::assistant(MISSING_KEY_MESSAGE));
        };

        let mut messages = Vec::new();
        let mut keywords = match self.generate_keywords(&theme).await {
            Ok(keywords) => keywords,
            Err(e) => {
                warn!("[TRENDS] Keyword generation failed: {}", e);
                messages.push(Message::assistant(format!(
                    "Failed to generate keywords for '{}'. Using theme as keyword.",
                    theme
                )));
                vec![theme.clone()]
            }
        };
        keywords.truncate(self.max_keywords);

        let mut trends = Vec::with_capacity(keywords.len());
        for (idx, keyword) in keywords.iter().enumerate() {
            if idx > 0 {
                pace(self.delay).await;
            }

            match client.lookup(keyword).await {
                Ok(response) => trends.push(score_trend(keyword, &response.organic_results)),
                Err(e) => {
                    warn!("[TRENDS] Lookup failed for '{}': {}", keyword, e);
                    trends.push(Trend::failed(keyword.clone(), e.to_string()));
                    messages.push(Message::assistant(format!(
                        "Error fetching trends for '{}': {}",
                        keyword, e
                    )));
                }
            }
        }

        info!("[TRENDS] Analyzed {} keyword(s) for '{}'", trends.len(), theme);
        messages.push(Message::assistant(format!(
            "Analyzed trends for '{}': {}",
            theme,
            keywords.join(", ")
        )));

        CampaignUpdate {
            trends: Some(trends),
            messages,
            ..CampaignUpdate::default()
        }
    }
}

/// Build a trend record from the organic results for one keyword
pub fn score_trend(keyword: &str, results: &[OrganicResult]) -> Trend {
    let related_content = results
        .iter()
        .take(TOP_CONTENT)
        .filter_map(|r| match (&r.title, &r.snippet) {
            (Some(title), Some(snippet)) => Some(RelatedContent {
                title: title.clone(),
                snippet: snippet.clone(),
            }),
            _ => None,
        })
        .collect();

    let related_queries = results
        .first()
        .map(|r| r.sitelinks.iter().take(TOP_QUERIES).cloned().collect())
        .unwrap_or_default();

    Trend {
        keyword: keyword.to_string(),
        relevance: 100,
        trend_direction: trend_direction(keyword, results),
        related_content,
        related_queries,
        error: None,
    }
}

/// Direction heuristic: how many of the top snippets mention the keyword
pub fn trend_direction(keyword: &str, results: &[OrganicResult]) -> TrendDirection {
    if results.is_empty() {
        return TrendDirection::Neutral;
    }

    let needle = keyword.to_lowercase();
    let mentions = results
        .iter()
        .take(DIRECTION_WINDOW)
        .filter(|r| {
            r.snippet
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .count();

    match mentions {
        n if n > 3 => TrendDirection::Increasing,
        n if n < 2 => TrendDirection::Decreasing,
        _ => TrendDirection::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{planned_state, scripted_llm};

    fn hit(title: &str, snippet: Option<&str>) -> OrganicResult {
        OrganicResult {
            title: Some(title.to_string()),
            snippet: snippet.map(str::to_string),
            link: None,
            sitelinks: Vec::new(),
        }
    }

    #[test]
    fn direction_counts_case_insensitive_mentions() {
        let many: Vec<OrganicResult> = (0..5)
            .map(|i| hit(&format!("r{i}"), Some("All about THRIFT fashion")))
            .collect();
        assert_eq!(trend_direction("thrift", &many), TrendDirection::Increasing);

        let some = vec![
            hit("a", Some("thrift")),
            hit("b", Some("thrift stores")),
            hit("c", Some("other")),
        ];
        assert_eq!(trend_direction("thrift", &some), TrendDirection::Neutral);

        let few = vec![hit("a", Some("thrift")), hit("b", None)];
        assert_eq!(trend_direction("thrift", &few), TrendDirection::Decreasing);
    }

    #[test]
    fn only_top_five_snippets_count() {
        let mut results: Vec<OrganicResult> = (0..5).map(|i| hit(&format!("r{i}"), Some("nothing"))).collect();
        results.extend((0..5).map(|i| hit(&format!("late{i}"), Some("upcycling"))));
        assert_eq!(trend_direction("upcycling", &results), TrendDirection::Decreasing);
    }

    #[test]
    fn score_trend_keeps_complete_top_results_and_sitelinks() {
        let mut first = hit("Top", Some("first snippet"));
        first.sitelinks = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let results = vec![first, hit("No snippet", None), hit("Third", Some("third")), hit("Fourth", Some("x"))];

        let trend = score_trend("kw", &results);
        assert_eq!(trend.relevance, 100);
        assert_eq!(trend.related_content.len(), 2);
        assert_eq!(trend.related_content[1].title, "Third");
        assert_eq!(trend.related_queries, vec!["a", "b", "c"]);
        assert!(trend.error.is_none());
    }

    #[tokio::test]
    async fn missing_key_degrades_to_error_trend() {
        let analyzer = TrendAnalyzer::new(scripted_llm(vec![]), None);
        let update = analyzer.execute(&planned_state("eco sneakers")).await;

        let trends = update.trends.unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].keyword, "eco sneakers");
        assert_eq!(trends[0].error.as_deref(), Some("Missing API key"));
        assert_eq!(update.messages, vec![Message::assistant(MISSING_KEY_MESSAGE)]);
    }

    #[tokio::test]
    async fn keyword_failure_falls_back_to_theme() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "eco sneakers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic_results": [{"title": "Eco sneakers rise", "snippet": "eco sneakers everywhere"}]
            })))
            .mount(&server)
            .await;

        let client = TrendLookupClient::new("serp").with_base_url(server.uri());
        let analyzer = TrendAnalyzer::new(scripted_llm(vec!["not json"]), Some(client))
            .with_delay(Duration::ZERO);
        let update = analyzer.execute(&planned_state("eco sneakers")).await;

        let trends = update.trends.unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].keyword, "eco sneakers");
        assert_eq!(trends[0].trend_direction, TrendDirection::Decreasing);
        assert_eq!(
            update.messages[0].content,
            "Failed to generate keywords for 'eco sneakers'. Using theme as keyword."
        );
        assert_eq!(
            update.messages.last().unwrap().content,
            "Analyzed trends for 'eco sneakers': eco sneakers"
        );
    }

    #[tokio::test]
    async fn caps_keywords_and_records_per_keyword_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "broken"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"organic_results": []})))
            .mount(&server)
            .await;

        let llm = scripted_llm(vec![r#"{"keywords": ["thrift", "broken", "resale", "vintage"]}"#]);
        let client = TrendLookupClient::new("serp").with_base_url(server.uri());
        let analyzer = TrendAnalyzer::new(llm, Some(client))
            .with_max_keywords(3)
            .with_delay(Duration::ZERO);
        let update = analyzer.execute(&planned_state("thrift")).await;

        let trends = update.trends.unwrap();
        let keywords: Vec<&str> = trends.iter().map(|t| t.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["thrift", "broken", "resale"]);
        assert!(trends[1].error.is_some());
        assert!(update
            .messages
            .iter()
            .any(|m| m.content.starts_with("Error fetching trends for 'broken'")));
        assert_eq!(
            update.messages.last().unwrap().content,
            "Analyzed trends for 'thrift': thrift, broken, resale"
        );
    }

    #[test]
    fn reports_its_kind() {
        let analyzer = TrendAnalyzer::new(scripted_llm(vec![]), None);
        let capability: Arc<dyn Capability> = Arc::new(analyzer);
        assert_eq!(capability.kind(), CapabilityKind::TrendAnalyzer);
    }
}
