//! Tavily web search client

use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};

const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Web search configuration
#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    pub api_key: String,
    pub default_num_results: u32,
    /// Overrides the vendor host, e.g. for a proxy or a mock server
    pub base_url: Option<String>,
}

impl WebSearchConfig {
    pub fn tavily(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            default_num_results: 5,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Search result item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Relevance score in [0, 1] when the provider reports one
    pub score: Option<f64>,
    pub published_date: Option<String>,
    pub source: Option<String>,
}

/// Web search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub search_time_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Response parse error: {0}")]
    ParseError(String),
    #[error("Rate limited")]
    RateLimited,
}

/// Web search provider abstraction
#[derive(Debug, Clone)]
pub struct WebSearchProvider {
    config: WebSearchConfig,
    client: Client,
}

impl WebSearchProvider {
    pub fn new(config: WebSearchConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(TAVILY_BASE_URL)
            .trim_end_matches('/')
    }

    /// Perform a web search
    pub async fn search(&self, query: &str, num_results: Option<u32>) -> Result<SearchResponse, SearchError> {
        let start = Instant::now();
        let num = num_results.unwrap_or(self.config.default_num_results);

        let mut results = self.search_tavily(query, num).await?;
        results.truncate(num as usize);

        tracing::debug!(
            "[SEARCH] Tavily returned {} results for '{}'",
            results.len(),
            query
        );

        Ok(SearchResponse {
            query: query.to_string(),
            results,
            search_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn search_tavily(&self, query: &str, num_results: u32) -> Result<Vec<SearchResult>, SearchError> {
        #[derive(Serialize)]
        struct TavilyRequest<'a> {
            api_key: &'a str,
            query: &'a str,
            search_depth: &'a str,
            max_results: u32,
            include_answer: bool,
            include_raw_content: bool,
        }

        #[derive(Deserialize)]
        struct TavilyResponse {
            #[serde(default)]
            results: Vec<TavilyResult>,
        }

        #[derive(Deserialize)]
        struct TavilyResult {
            #[serde(default)]
            title: String,
            url: String,
            #[serde(default)]
            content: String,
            score: Option<f64>,
            published_date: Option<String>,
        }

        let response = self
            .client
            .post(format!("{}/search", self.base_url()))
            .json(&TavilyRequest {
                api_key: &self.config.api_key,
                query,
                search_depth: "basic",
                max_results: num_results,
                include_answer: true,
                include_raw_content: false,
            })
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::ApiError(format!("Tavily API error: {}", status)));
        }

        let tavily_response: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        Ok(tavily_response
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                snippet: r.content,
                score: r.score,
                published_date: r.published_date,
                source: Some("tavily".to_string()),
            })
            .collect())
    }
}
