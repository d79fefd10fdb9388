//! One-shot planner: turns the user's request into campaign parameters and a plan

use serde_json::Value;
use tracing::{info, warn};

use super::types::{
    CampaignState, CampaignUpdate, CurrentStep, Message, Plan, StepKind, DEFAULT_AUDIENCE,
    DEFAULT_DURATION_SECONDS, DEFAULT_TONE,
};
use crate::brain::LLMClient;

pub const MISSING_THEME_MESSAGE: &str = "Please provide a campaign theme.";

const PLANNER_SYSTEM_PROMPT: &str = "You are a marketing campaign planner. \
You read a campaign request and answer with a single JSON object, nothing else.";

fn planner_prompt(user_input: &str) -> String {
    format!(
        "Extract from '{user_input}':\n\
         1. campaign_theme (main subject, required)\n\
         2. target_audience (default: '{DEFAULT_AUDIENCE}')\n\
         3. duration_seconds (default: {DEFAULT_DURATION_SECONDS})\n\
         4. tone (e.g., humorous, professional, default: '{DEFAULT_TONE}')\n\
         Return a JSON object with 'parameters' and 'plan' fields.\n\
         parameters: the extracted fields.\n\
         plan: a list of steps, each an object with a 'step' tool name, chosen from the request.\n\
         Available tools: trend_analyzer, search_engine, hashtag_generator, script_generator.\n\
         hashtag_generator and script_generator must come after trend_analyzer and search_engine.\n\
         For a full campaign include all tools in that order; for research only, include \
         trend_analyzer and search_engine."
    )
}

/// Campaign parameters and steps read out of an untrusted classifier response
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub campaign_theme: Option<String>,
    pub target_audience: String,
    pub duration_seconds: u32,
    pub tone: String,
    pub steps: Vec<StepKind>,
    /// Tags the classifier returned that name no known step
    pub ignored: Vec<String>,
}

impl Classification {
    /// Validate a classifier response field by field, defaulting anything unusable
    pub fn from_value(value: &Value) -> Self {
        let params = match value.get("parameters") {
            Some(p) if p.is_object() => p,
            _ => value,
        };

        let steps_value = value
            .get("plan")
            .filter(|v| v.is_array())
            .or_else(|| value.get("steps").filter(|v| v.is_array()));

        let mut steps = Vec::new();
        let mut ignored = Vec::new();
        if let Some(Value::Array(entries)) = steps_value {
            for entry in entries {
                let Some(tag) = step_tag(entry) else {
                    continue;
                };
                match StepKind::parse(tag) {
                    Some(kind) => steps.push(kind),
                    None => ignored.push(tag.to_string()),
                }
            }
        }

        Self {
            campaign_theme: text_field(params, "campaign_theme"),
            target_audience: text_field(params, "target_audience")
                .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
            duration_seconds: params
                .get("duration_seconds")
                .and_then(positive_seconds)
                .unwrap_or(DEFAULT_DURATION_SECONDS),
            tone: text_field(params, "tone").unwrap_or_else(|| DEFAULT_TONE.to_string()),
            steps,
            ignored,
        }
    }
}

pub(crate) fn step_tag(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => entry.get("step").and_then(Value::as_str),
        _ => None,
    }
}

fn text_field(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn positive_seconds(value: &Value) -> Option<u32> {
    let seconds = match value {
        Value::Number(n) => match n.as_u64() {
            Some(v) => v as f64,
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if seconds.is_finite()
        && seconds.fract() == 0.0
        && seconds >= 1.0
        && seconds <= u32::MAX as f64
    {
        Some(seconds as u32)
    } else {
        None
    }
}

/// Dedupe steps and move research ahead of synthesis, keeping relative order
///
/// Returns the repaired order and whether anything changed.
pub fn repair_order(steps: &[StepKind]) -> (Vec<StepKind>, bool) {
    let mut unique: Vec<StepKind> = Vec::with_capacity(steps.len());
    for kind in steps {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }

    let (research, synthesis): (Vec<StepKind>, Vec<StepKind>) =
        unique.into_iter().partition(StepKind::is_research);
    let repaired: Vec<StepKind> = research.into_iter().chain(synthesis).collect();

    let changed = repaired.as_slice() != steps;
    (repaired, changed)
}

#[derive(Clone)]
pub struct Planner {
    llm: LLMClient,
}

impl Planner {
    pub fn new(llm: LLMClient) -> Self {
        Self { llm }
    }

    /// Classify the first user message; never fails, errors end the run
    pub async fn plan(&self, state: &CampaignState) -> CampaignUpdate {
        let Some(user_input) = state
            .first_user_message()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            warn!("[PLANNER] No user message to plan from");
            return CampaignUpdate::end_with(Message::assistant(MISSING_THEME_MESSAGE));
        };

        info!("[PLANNER] Extracting campaign parameters");
        match self
            .llm
            .complete_json(PLANNER_SYSTEM_PROMPT, &planner_prompt(user_input))
            .await
        {
            Ok(value) => Self::planning_update(Classification::from_value(&value)),
            Err(e) => {
                warn!("[PLANNER] Classifier call failed: {}", e);
                CampaignUpdate::end_with(Message::assistant(format!(
                    "Error initializing workflow: {}",
                    e
                )))
            }
        }
    }

    /// Build the state update for a validated classification
    pub fn planning_update(classification: Classification) -> CampaignUpdate {
        let Some(theme) = classification.campaign_theme else {
            info!("[PLANNER] Classifier found no campaign theme");
            return CampaignUpdate::end_with(Message::assistant(MISSING_THEME_MESSAGE));
        };

        let (ordered, repaired) = repair_order(&classification.steps);
        if repaired {
            warn!(
                "[PLANNER] Repaired step order {:?} -> {:?}",
                classification.steps, ordered
            );
        }

        let plan = Plan::new(ordered);
        let current_step = match plan.next_pending() {
            Some(kind) => CurrentStep::Run(kind),
            None => CurrentStep::End,
        };

        let mut summary = format!(
            "Parameters: campaign_theme='{}', target_audience='{}', duration_seconds={}, tone='{}'; Steps: {}",
            theme,
            classification.target_audience,
            classification.duration_seconds,
            classification.tone,
            plan
        );
        if repaired {
            summary.push_str(" (deduplicated and reordered: research before synthesis)");
        }
        if !classification.ignored.is_empty() {
            summary.push_str(&format!(
                " (ignored unknown steps: {})",
                classification.ignored.join(", ")
            ));
        }

        info!(
            "[PLANNER] Planned {} step(s) for '{}', starting at '{}'",
            plan.len(),
            theme,
            current_step
        );

        CampaignUpdate {
            campaign_theme: Some(theme),
            target_audience: Some(classification.target_audience),
            duration_seconds: Some(classification.duration_seconds),
            tone: Some(classification.tone),
            plan: Some(plan),
            current_step: Some(current_step),
            ..CampaignUpdate::default()
        }
        .with_message(Message::system(summary))
    }
}
