//! Shared fixtures for unit tests

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    brain::{
        ChatRequest, LLMClient, LLMConfig, LLMProviderTrait, ProviderError, ProviderResponse,
        ProviderType,
    },
    capabilities::{Capability, CapabilitySet},
    workflow::{
        review::CompletionReview,
        types::{CampaignState, CampaignUpdate, CapabilityKind, Message, StepKind},
    },
};

/// Replays queued completions in order; an empty queue is a provider error
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProviderTrait for ScriptedProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenAI
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ProviderResponse, ProviderError> {
        let user = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(user);

        match self.replies.lock().unwrap().pop_front() {
            Some(content) => Ok(ProviderResponse {
                content,
                usage: None,
            }),
            None => Err(ProviderError::NotAvailable(
                "scripted provider has no replies left".to_string(),
            )),
        }
    }
}

pub fn scripted_llm(replies: Vec<&str>) -> LLMClient {
    scripted_llm_with_handle(replies).0
}

pub fn scripted_llm_with_handle(replies: Vec<&str>) -> (LLMClient, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::new(replies));
    let client = LLMClient::with_provider(LLMConfig::default(), provider.clone());
    (client, provider)
}

/// A state that has been planned around `theme`
pub fn planned_state(theme: &str) -> CampaignState {
    let mut state = CampaignState::new(format!("Create a campaign about {}", theme));
    state.campaign_theme = theme.to_string();
    state
}

/// Classifier reply carrying the given theme and step tags
pub fn classification_json(theme: &str, steps: &[&str]) -> String {
    let plan: Vec<serde_json::Value> = steps
        .iter()
        .map(|s| serde_json::json!({ "step": s }))
        .collect();
    serde_json::json!({
        "parameters": { "campaign_theme": theme },
        "plan": plan
    })
    .to_string()
}

pub type CallLog = Arc<Mutex<Vec<CapabilityKind>>>;

/// Records each call and leaves a marker in its output field
pub struct RecordingCapability {
    kind: CapabilityKind,
    calls: CallLog,
}

#[async_trait]
impl Capability for RecordingCapability {
    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    async fn execute(&self, _state: &CampaignState) -> CampaignUpdate {
        self.calls.lock().unwrap().push(self.kind);

        let mut update = CampaignUpdate::default();
        match self.kind {
            CapabilityKind::TrendAnalyzer => update.trends = Some(Vec::new()),
            CapabilityKind::SearchEngine => update.search_results = Some(Vec::new()),
            CapabilityKind::HashtagGenerator => update.hashtags = Some(vec!["#Recorded".to_string()]),
            CapabilityKind::ScriptGenerator => update.script = Some("Recorded script.".to_string()),
            CapabilityKind::SpeechSynthesizer => {}
        }
        update.with_message(Message::assistant(format!("ran {:?}", self.kind)))
    }
}

pub fn recording_capabilities() -> (CapabilitySet, CallLog) {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let make = |kind| -> Arc<dyn Capability> {
        Arc::new(RecordingCapability {
            kind,
            calls: calls.clone(),
        })
    };

    let set = CapabilitySet::new(
        make(CapabilityKind::TrendAnalyzer),
        make(CapabilityKind::SearchEngine),
        make(CapabilityKind::HashtagGenerator),
        make(CapabilityKind::ScriptGenerator),
        make(CapabilityKind::SpeechSynthesizer),
    );
    (set, calls)
}

/// Completion review with a fixed answer, counting how often it was asked
pub struct FixedReview {
    pub answer: Result<Vec<StepKind>, String>,
    pub asked: Mutex<usize>,
}

impl FixedReview {
    pub fn new(answer: Result<Vec<StepKind>, String>) -> Self {
        Self {
            answer,
            asked: Mutex::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        *self.asked.lock().unwrap()
    }
}

#[async_trait]
impl CompletionReview for FixedReview {
    async fn review(&self, _state: &CampaignState) -> Result<Vec<StepKind>, ProviderError> {
        *self.asked.lock().unwrap() += 1;
        self.answer
            .clone()
            .map_err(ProviderError::RequestFailed)
    }
}
