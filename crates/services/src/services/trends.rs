//! Trend lookup over SerpAPI's lightweight Google engine
//!
//! Returns the raw organic results for a keyword; scoring them into a trend
//! signal is the caller's job.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::research::SearchError;

const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const DEFAULT_LOCATION: &str = "United States";

/// One organic search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
    /// Titles of the inline sitelinks attached to this hit
    pub sitelinks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendLookupResponse {
    pub keyword: String,
    pub organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Clone)]
pub struct TrendLookupClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TrendLookupClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn lookup(&self, keyword: &str) -> Result<TrendLookupResponse, SearchError> {
        #[derive(Deserialize)]
        struct SerpResponse {
            #[serde(default)]
            organic_results: Vec<SerpOrganic>,
            error: Option<String>,
        }

        #[derive(Deserialize)]
        struct SerpOrganic {
            title: Option<String>,
            snippet: Option<String>,
            link: Option<String>,
            sitelinks: Option<SerpSitelinks>,
        }

        #[derive(Deserialize)]
        struct SerpSitelinks {
            #[serde(default)]
            inline: Vec<SerpSitelink>,
        }

        #[derive(Deserialize)]
        struct SerpSitelink {
            title: Option<String>,
        }

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("engine", "google_light"),
                ("q", keyword),
                ("location", DEFAULT_LOCATION),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::ApiError(format!("SerpAPI error: {}", status)));
        }

        let body: SerpResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        // SerpAPI reports quota and query problems in-band with a 200.
        if let Some(error) = body.error {
            return Err(SearchError::ApiError(error));
        }

        let organic_results = body
            .organic_results
            .into_iter()
            .map(|r| OrganicResult {
                title: r.title,
                snippet: r.snippet,
                link: r.link,
                sitelinks: r
                    .sitelinks
                    .map(|s| s.inline.into_iter().filter_map(|l| l.title).collect())
                    .unwrap_or_default(),
            })
            .collect();

        Ok(TrendLookupResponse {
            keyword: keyword.to_string(),
            organic_results,
        })
    }
}
