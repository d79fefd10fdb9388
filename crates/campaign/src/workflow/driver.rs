//! Workflow driver: router, dispatch, apply, repeat

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::{
    planner::Planner,
    review::LlmCompletionReview,
    router::Router,
    types::{CampaignRequest, CampaignState, CapabilityKind, CurrentStep},
};
use crate::{
    brain::LLMClient, capabilities::CapabilitySet, config::CampaignConfig, CampaignError, Result,
};

/// Runs campaign requests end to end
///
/// Cloning is cheap and every clone shares the same immutable dependencies,
/// so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct CampaignWorkflow {
    router: Router,
    capabilities: CapabilitySet,
}

impl CampaignWorkflow {
    pub fn new(router: Router, capabilities: CapabilitySet) -> Self {
        Self {
            router,
            capabilities,
        }
    }

    pub fn from_config(config: &CampaignConfig) -> Self {
        let llm = LLMClient::new(config.llm.clone(), config.openai_api_key.clone());

        let mut router = Router::new(Planner::new(llm.clone()));
        if config.review_completion {
            router = router.with_review(Arc::new(LlmCompletionReview::new(llm.clone())));
        }

        Self::new(router, CapabilitySet::from_config(config, llm))
    }

    pub async fn run(&self, request: CampaignRequest) -> Result<CampaignState> {
        if request.prompt.trim().is_empty() {
            return Err(CampaignError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        self.drive(request)
            .instrument(info_span!("campaign_run", %run_id))
            .await
    }

    async fn drive(&self, request: CampaignRequest) -> Result<CampaignState> {
        info!("[WORKFLOW] Starting campaign run");
        let mut state = CampaignState::new(request.prompt);
        let mut dispatched = 0usize;

        loop {
            let update = self.router.route(&state).await;
            state.apply(update);

            match state.current_step {
                CurrentStep::Run(kind) => {
                    info!("[WORKFLOW] Dispatching '{}'", kind);
                    let update = self.capabilities.for_step(kind).execute(&state).await;
                    state.apply(update);
                    dispatched += 1;
                }
                CurrentStep::End => break,
                CurrentStep::Unplanned => {
                    return Err(CampaignError::Internal(
                        "router left the workflow unplanned".to_string(),
                    ));
                }
            }
        }

        if request.synthesize_speech {
            if state.script.trim().is_empty() {
                debug!("[WORKFLOW] Speech requested but no script was produced");
            } else {
                let speech = self.capabilities.get(CapabilityKind::SpeechSynthesizer);
                let update = speech.execute(&state).await;
                state.apply(update);
            }
        }

        info!(
            "[WORKFLOW] Completed: {} dispatch(es), {}/{} planned step(s) executed, {} message(s)",
            dispatched,
            state.plan.executed_count(),
            state.plan.len(),
            state.messages.len()
        );
        Ok(state)
    }
}
