//! Runtime configuration, read from the process environment

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    brain::{LLMConfig, ProviderType},
    CampaignError, Result,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignConfig {
    pub llm: LLMConfig,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub serpapi_key: Option<String>,
    #[serde(skip_serializing)]
    pub tavily_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    pub tts_voice: String,
    pub tts_model: String,
    /// Delay between sequential external calls inside one capability
    pub rate_limit_ms: u64,
    pub max_trend_keywords: usize,
    /// Ask the model once, after the plan is exhausted, whether steps are missing
    pub review_completion: bool,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            openai_api_key: None,
            serpapi_key: None,
            tavily_api_key: None,
            gemini_api_key: None,
            tts_voice: "Kore".to_string(),
            tts_model: "gemini-2.5-flash-preview-tts".to_string(),
            rate_limit_ms: 1000,
            max_trend_keywords: 5,
            review_completion: false,
        }
    }
}

impl CampaignConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let provider = match get("CAMPAIGN_LLM_PROVIDER") {
            Some(raw) => raw.parse::<ProviderType>().map_err(CampaignError::Config)?,
            None => defaults.llm.provider,
        };

        let llm = LLMConfig {
            provider,
            model: get("CAMPAIGN_LLM_MODEL").unwrap_or(defaults.llm.model),
            temperature: parse_var(&get, "CAMPAIGN_LLM_TEMPERATURE", defaults.llm.temperature)?,
            max_tokens: parse_var(&get, "CAMPAIGN_LLM_MAX_TOKENS", defaults.llm.max_tokens)?,
            endpoint: get("CAMPAIGN_LLM_ENDPOINT"),
        };

        Ok(Self {
            llm,
            openai_api_key: get("OPENAI_API_KEY"),
            serpapi_key: get("SERPAPI_KEY").or_else(|| get("NEW_SERPAPI_KEY")),
            tavily_api_key: get("TAVILY_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            tts_voice: get("CAMPAIGN_TTS_VOICE").unwrap_or(defaults.tts_voice),
            tts_model: get("CAMPAIGN_TTS_MODEL").unwrap_or(defaults.tts_model),
            rate_limit_ms: parse_var(&get, "CAMPAIGN_RATE_LIMIT_MS", defaults.rate_limit_ms)?,
            max_trend_keywords: parse_var(
                &get,
                "CAMPAIGN_MAX_TREND_KEYWORDS",
                defaults.max_trend_keywords,
            )?,
            review_completion: parse_var(
                &get,
                "CAMPAIGN_REVIEW_COMPLETION",
                defaults.review_completion,
            )?,
        })
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| CampaignError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}
