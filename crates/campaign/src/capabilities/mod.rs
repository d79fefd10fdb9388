//! Content-generation capabilities dispatched by the workflow driver
//!
//! A capability reads the current state and returns a partial update plus
//! log entries. Failures degrade to a visible message and a fallback value;
//! nothing is raised back to the router.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use services::services::{
    GeminiSpeechClient, SpeechConfig, TrendLookupClient, WebSearchConfig, WebSearchProvider,
};

use crate::{
    brain::LLMClient,
    config::CampaignConfig,
    workflow::types::{CampaignState, CampaignUpdate, CapabilityKind, StepKind},
};

pub mod hashtags;
pub mod script;
pub mod search;
pub mod speech;
pub mod trends;

pub use hashtags::HashtagGenerator;
pub use script::ScriptGenerator;
pub use search::SearchEngine;
pub use speech::SpeechSynthesizer;
pub use trends::TrendAnalyzer;

#[async_trait]
pub trait Capability: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    async fn execute(&self, state: &CampaignState) -> CampaignUpdate;
}

/// The five capabilities, addressed through closed enums only
#[derive(Clone)]
pub struct CapabilitySet {
    trends: Arc<dyn Capability>,
    search: Arc<dyn Capability>,
    hashtags: Arc<dyn Capability>,
    script: Arc<dyn Capability>,
    speech: Arc<dyn Capability>,
}

impl CapabilitySet {
    pub fn new(
        trends: Arc<dyn Capability>,
        search: Arc<dyn Capability>,
        hashtags: Arc<dyn Capability>,
        script: Arc<dyn Capability>,
        speech: Arc<dyn Capability>,
    ) -> Self {
        Self {
            trends,
            search,
            hashtags,
            script,
            speech,
        }
    }

    /// Wire the production capabilities from configuration
    pub fn from_config(config: &CampaignConfig, llm: LLMClient) -> Self {
        let delay = config.rate_limit();

        let trend_client = config.serpapi_key.clone().map(TrendLookupClient::new);
        let search_client = config
            .tavily_api_key
            .clone()
            .map(|key| WebSearchProvider::new(WebSearchConfig::tavily(key)));
        let speech_client = config.gemini_api_key.clone().map(|key| {
            GeminiSpeechClient::new(SpeechConfig {
                api_key: key,
                model: config.tts_model.clone(),
                voice_name: config.tts_voice.clone(),
            })
        });

        Self::new(
            Arc::new(
                TrendAnalyzer::new(llm.clone(), trend_client)
                    .with_max_keywords(config.max_trend_keywords)
                    .with_delay(delay),
            ),
            Arc::new(SearchEngine::new(search_client).with_delay(delay)),
            Arc::new(HashtagGenerator::new(llm.clone())),
            Arc::new(ScriptGenerator::new(llm)),
            Arc::new(SpeechSynthesizer::new(speech_client)),
        )
    }

    pub fn for_step(&self, kind: StepKind) -> &dyn Capability {
        match kind {
            StepKind::TrendAnalyzer => self.trends.as_ref(),
            StepKind::SearchEngine => self.search.as_ref(),
            StepKind::HashtagGenerator => self.hashtags.as_ref(),
            StepKind::ScriptGenerator => self.script.as_ref(),
        }
    }

    pub fn get(&self, kind: CapabilityKind) -> &dyn Capability {
        match kind {
            CapabilityKind::TrendAnalyzer => self.trends.as_ref(),
            CapabilityKind::SearchEngine => self.search.as_ref(),
            CapabilityKind::HashtagGenerator => self.hashtags.as_ref(),
            CapabilityKind::ScriptGenerator => self.script.as_ref(),
            CapabilityKind::SpeechSynthesizer => self.speech.as_ref(),
        }
    }
}

/// Pause between sequential external calls; zero skips the timer
pub(crate) async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
