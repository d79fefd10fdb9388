//! Core types for campaign workflow state

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of the four capabilities a plan may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    TrendAnalyzer,
    SearchEngine,
    HashtagGenerator,
    ScriptGenerator,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::TrendAnalyzer,
        StepKind::SearchEngine,
        StepKind::HashtagGenerator,
        StepKind::ScriptGenerator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::TrendAnalyzer => "trend_analyzer",
            StepKind::SearchEngine => "search_engine",
            StepKind::HashtagGenerator => "hashtag_generator",
            StepKind::ScriptGenerator => "script_generator",
        }
    }

    /// Parse a tag as the model may spell it; unknown tags yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "trend_analyzer" | "trend_lookup" => Some(StepKind::TrendAnalyzer),
            "search_engine" | "web_search" => Some(StepKind::SearchEngine),
            "hashtag_generator" | "hashtag_synthesis" => Some(StepKind::HashtagGenerator),
            "script_generator" | "script_synthesis" => Some(StepKind::ScriptGenerator),
            _ => None,
        }
    }

    /// Research steps gather inputs that synthesis steps consume
    pub fn is_research(&self) -> bool {
        matches!(self, StepKind::TrendAnalyzer | StepKind::SearchEngine)
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every capability the driver can dispatch, including the non-plannable speech step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    TrendAnalyzer,
    SearchEngine,
    HashtagGenerator,
    ScriptGenerator,
    SpeechSynthesizer,
}

impl From<StepKind> for CapabilityKind {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::TrendAnalyzer => CapabilityKind::TrendAnalyzer,
            StepKind::SearchEngine => CapabilityKind::SearchEngine,
            StepKind::HashtagGenerator => CapabilityKind::HashtagGenerator,
            StepKind::ScriptGenerator => CapabilityKind::ScriptGenerator,
        }
    }
}

/// Terminal marker as it appears on the wire
pub const END_MARKER: &str = "END";

/// Where the workflow stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentStep {
    /// No plan yet; the router will call the planner
    #[default]
    Unplanned,
    Run(StepKind),
    End,
}

impl CurrentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentStep::Unplanned => "",
            CurrentStep::Run(kind) => kind.as_str(),
            CurrentStep::End => END_MARKER,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CurrentStep::End)
    }
}

impl std::fmt::Display for CurrentStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CurrentStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurrentStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim() {
            "" => Ok(CurrentStep::Unplanned),
            END_MARKER => Ok(CurrentStep::End),
            other => StepKind::parse(other)
                .map(CurrentStep::Run)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown step: {}", other))),
        }
    }
}

/// A planned capability invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: StepKind,
    pub executed: bool,
}

/// The ordered execution plan, fixed once created apart from `executed` flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn new(kinds: impl IntoIterator<Item = StepKind>) -> Self {
        Self {
            steps: kinds
                .into_iter()
                .map(|name| Step {
                    name,
                    executed: false,
                })
                .collect(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn kinds(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.steps.iter().map(|s| s.name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, kind: StepKind) -> bool {
        self.steps.iter().any(|s| s.name == kind)
    }

    /// Mark the first unexecuted step of `kind`; returns whether one was found
    pub fn mark_executed(&mut self, kind: StepKind) -> bool {
        match self
            .steps
            .iter_mut()
            .find(|s| s.name == kind && !s.executed)
        {
            Some(step) => {
                step.executed = true;
                true
            }
            None => false,
        }
    }

    /// First unexecuted step in plan order
    pub fn next_pending(&self) -> Option<StepKind> {
        self.steps.iter().find(|s| !s.executed).map(|s| s.name)
    }

    pub fn executed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.executed).count()
    }

    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.executed)
    }

    /// Append new steps at the end; existing steps keep their order and flags
    pub fn extend(&mut self, kinds: impl IntoIterator<Item = StepKind>) {
        self.steps.extend(kinds.into_iter().map(|name| Step {
            name,
            executed: false,
        }));
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.kinds().map(|k| k.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
            Role::System => f.write_str("system"),
        }
    }
}

/// An entry in the run's audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Neutral,
    #[default]
    Unknown,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Neutral => "neutral",
            TrendDirection::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedContent {
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub keyword: String,
    pub relevance: u32,
    pub trend_direction: TrendDirection,
    #[serde(default)]
    pub related_content: Vec<RelatedContent>,
    #[serde(default)]
    pub related_queries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Trend {
    pub fn failed(keyword: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            relevance: 0,
            trend_direction: TrendDirection::Unknown,
            related_content: Vec::new(),
            related_queries: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: Option<f64>,
}

/// Search results for one term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub term: String,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Synthesized narration, base64 encoded 16-bit PCM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechClip {
    pub audio_base64: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub byte_len: usize,
}

impl SpeechClip {
    pub fn duration_ms(&self) -> u64 {
        let bytes_per_second = self.sample_rate as u64 * self.channels as u64 * 2;
        if bytes_per_second == 0 {
            return 0;
        }
        self.byte_len as u64 * 1000 / bytes_per_second
    }
}

/// Inbound request for one campaign run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub prompt: String,
    #[serde(default)]
    pub synthesize_speech: bool,
}

impl CampaignRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            synthesize_speech: false,
        }
    }

    pub fn with_speech(mut self, enabled: bool) -> Self {
        self.synthesize_speech = enabled;
        self
    }
}

pub const DEFAULT_AUDIENCE: &str = "general audience";
pub const DEFAULT_DURATION_SECONDS: u32 = 60;
pub const DEFAULT_TONE: &str = "neutral";

/// Everything one run knows; owned by the driver for the length of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignState {
    pub campaign_theme: String,
    pub target_audience: String,
    pub duration_seconds: u32,
    pub tone: String,
    pub plan: Plan,
    pub trends: Vec<Trend>,
    pub search_results: Vec<SearchResultSet>,
    pub hashtags: Vec<String>,
    pub script: String,
    pub production_ideas: Vec<String>,
    pub speech: Option<SpeechClip>,
    pub messages: Vec<Message>,
    pub current_step: CurrentStep,
    /// Set once the completion review has been consulted
    #[serde(default)]
    pub reviewed: bool,
}

impl Default for CampaignState {
    fn default() -> Self {
        Self {
            campaign_theme: String::new(),
            target_audience: DEFAULT_AUDIENCE.to_string(),
            duration_seconds: DEFAULT_DURATION_SECONDS,
            tone: DEFAULT_TONE.to_string(),
            plan: Plan::default(),
            trends: Vec::new(),
            search_results: Vec::new(),
            hashtags: Vec::new(),
            script: String::new(),
            production_ideas: Vec::new(),
            speech: None,
            messages: Vec::new(),
            current_step: CurrentStep::Unplanned,
            reviewed: false,
        }
    }
}

impl CampaignState {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
            ..Self::default()
        }
    }

    pub fn first_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    pub fn is_terminal(&self) -> bool {
        self.current_step.is_terminal()
    }

    /// Keywords of every trend recorded so far
    pub fn trend_keywords(&self) -> Vec<String> {
        self.trends.iter().map(|t| t.keyword.clone()).collect()
    }

    /// Merge a partial update: fields are replaced, messages appended
    pub fn apply(&mut self, update: CampaignUpdate) {
        let CampaignUpdate {
            campaign_theme,
            target_audience,
            duration_seconds,
            tone,
            plan,
            trends,
            search_results,
            hashtags,
            script,
            production_ideas,
            speech,
            current_step,
            reviewed,
            messages,
        } = update;

        if let Some(v) = campaign_theme {
            self.campaign_theme = v;
        }
        if let Some(v) = target_audience {
            self.target_audience = v;
        }
        if let Some(v) = duration_seconds {
            self.duration_seconds = v;
        }
        if let Some(v) = tone {
            self.tone = v;
        }
        if let Some(v) = plan {
            self.plan = v;
        }
        if let Some(v) = trends {
            self.trends = v;
        }
        if let Some(v) = search_results {
            self.search_results = v;
        }
        if let Some(v) = hashtags {
            self.hashtags = v;
        }
        if let Some(v) = script {
            self.script = v;
        }
        if let Some(v) = production_ideas {
            self.production_ideas = v;
        }
        if let Some(v) = speech {
            self.speech = Some(v);
        }
        if let Some(v) = current_step {
            self.current_step = v;
        }
        if let Some(v) = reviewed {
            self.reviewed = v;
        }
        self.messages.extend(messages);
    }
}

/// Partial state update returned by the router and every capability
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignUpdate {
    pub campaign_theme: Option<String>,
    pub target_audience: Option<String>,
    pub duration_seconds: Option<u32>,
    pub tone: Option<String>,
    pub plan: Option<Plan>,
    pub trends: Option<Vec<Trend>>,
    pub search_results: Option<Vec<SearchResultSet>>,
    pub hashtags: Option<Vec<String>>,
    pub script: Option<String>,
    pub production_ideas: Option<Vec<String>>,
    pub speech: Option<SpeechClip>,
    pub current_step: Option<CurrentStep>,
    pub reviewed: Option<bool>,
    /// Appended to the log, never replacing it
    pub messages: Vec<Message>,
}

impl CampaignUpdate {
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Terminate the run with a single explanatory entry
    pub fn end_with(message: Message) -> Self {
        Self {
            current_step: Some(CurrentStep::End),
            ..Self::default()
        }
        .with_message(message)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_kind_parses_aliases_case_insensitively() {
        assert_eq!(StepKind::parse("trend_analyzer"), Some(StepKind::TrendAnalyzer));
        assert_eq!(StepKind::parse("Trend-Lookup"), Some(StepKind::TrendAnalyzer));
        assert_eq!(StepKind::parse(" WEB-SEARCH "), Some(StepKind::SearchEngine));
        assert_eq!(StepKind::parse("hashtag-synthesis"), Some(StepKind::HashtagGenerator));
        assert_eq!(StepKind::parse("script_generator"), Some(StepKind::ScriptGenerator));
        assert_eq!(StepKind::parse("video_editor"), None);
        assert_eq!(StepKind::parse(""), None);
    }

    #[test]
    fn current_step_wire_format() {
        assert_eq!(serde_json::to_string(&CurrentStep::Unplanned).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&CurrentStep::End).unwrap(), "\"END\"");
        assert_eq!(
            serde_json::to_string(&CurrentStep::Run(StepKind::SearchEngine)).unwrap(),
            "\"search_engine\""
        );

        let parsed: CurrentStep = serde_json::from_str("\"hashtag_generator\"").unwrap();
        assert_eq!(parsed, CurrentStep::Run(StepKind::HashtagGenerator));
        assert!(serde_json::from_str::<CurrentStep>("\"teleport\"").is_err());
    }

    #[test]
    fn terminal_marker_differs_from_every_tag() {
        for kind in StepKind::ALL {
            assert_ne!(kind.as_str(), END_MARKER);
            assert_ne!(CurrentStep::Run(kind), CurrentStep::End);
        }
    }

    #[test]
    fn mark_executed_only_touches_first_pending_match() {
        let mut plan = Plan::new([
            StepKind::TrendAnalyzer,
            StepKind::ScriptGenerator,
            StepKind::TrendAnalyzer,
        ]);

        assert!(plan.mark_executed(StepKind::TrendAnalyzer));
        assert_eq!(plan.executed_count(), 1);
        assert_eq!(plan.next_pending(), Some(StepKind::ScriptGenerator));

        assert!(plan.mark_executed(StepKind::TrendAnalyzer));
        assert!(!plan.mark_executed(StepKind::TrendAnalyzer));
        assert_eq!(plan.executed_count(), 2);
        assert!(!plan.mark_executed(StepKind::SearchEngine));
    }

    #[test]
    fn plan_serializes_as_step_list() {
        let mut plan = Plan::new([StepKind::TrendAnalyzer, StepKind::SearchEngine]);
        plan.mark_executed(StepKind::TrendAnalyzer);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "trend_analyzer", "executed": true},
                {"name": "search_engine", "executed": false}
            ])
        );
        assert_eq!(plan.to_string(), "[trend_analyzer, search_engine]");
    }

    #[test]
    fn new_state_has_defaults_and_prompt() {
        let state = CampaignState::new("Launch a sneaker line");
        assert_eq!(state.campaign_theme, "");
        assert_eq!(state.target_audience, "general audience");
        assert_eq!(state.duration_seconds, 60);
        assert_eq!(state.tone, "neutral");
        assert_eq!(state.current_step, CurrentStep::Unplanned);
        assert_eq!(state.first_user_message(), Some("Launch a sneaker line"));
        assert!(state.plan.is_empty());
    }

    #[test]
    fn apply_replaces_fields_and_appends_messages() {
        let mut state = CampaignState::new("prompt");
        state.hashtags = vec!["#Old".to_string()];

        state.apply(CampaignUpdate {
            hashtags: Some(vec!["#New".to_string()]),
            tone: Some("humorous".to_string()),
            ..CampaignUpdate::default()
        }
        .with_message(Message::assistant("done")));

        assert_eq!(state.hashtags, vec!["#New"]);
        assert_eq!(state.tone, "humorous");
        assert_eq!(state.target_audience, "general audience");
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0], Message::user("prompt"));
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut state = CampaignState::new("prompt");
        let before = state.clone();
        let update = CampaignUpdate::default();
        assert!(update.is_empty());
        state.apply(update);
        assert_eq!(state, before);
    }

    #[test]
    fn speech_clip_duration() {
        let clip = SpeechClip {
            audio_base64: String::new(),
            sample_rate: 24_000,
            channels: 1,
            byte_len: 96_000,
        };
        assert_eq!(clip.duration_ms(), 2000);
    }
}
