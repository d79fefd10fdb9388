//! Step engine - decides which capability runs next or ends the workflow

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    planner::{Planner, repair_order},
    review::CompletionReview,
    types::{CampaignState, CampaignUpdate, CurrentStep, Message, Plan, StepKind},
};

pub const COMPLETION_MESSAGE: &str = "All planned steps have been executed. Workflow complete.";

/// Walks the plan left to right, one completed step per call
///
/// Never executes a capability itself and never fails: every call returns an
/// update the driver can apply.
#[derive(Clone)]
pub struct Router {
    planner: Planner,
    review: Option<Arc<dyn CompletionReview>>,
}

impl Router {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            review: None,
        }
    }

    /// Attach a completion review, consulted at most once per run
    pub fn with_review(mut self, review: Arc<dyn CompletionReview>) -> Self {
        self.review = Some(review);
        self
    }

    pub async fn route(&self, state: &CampaignState) -> CampaignUpdate {
        match state.current_step {
            CurrentStep::End => {
                debug!("[ROUTER] Workflow already terminal, nothing to route");
                CampaignUpdate::default()
            }
            CurrentStep::Unplanned => self.planner.plan(state).await,
            CurrentStep::Run(completed) => self.advance(state, completed).await,
        }
    }

    async fn advance(&self, state: &CampaignState, completed: StepKind) -> CampaignUpdate {
        let mut plan = state.plan.clone();
        if !plan.mark_executed(completed) {
            warn!(
                "[ROUTER] '{}' completed but has no pending entry in plan {}",
                completed, plan
            );
        }

        if let Some(next) = plan.next_pending() {
            debug!(
                "[ROUTER] '{}' done ({}/{}), next '{}'",
                completed,
                plan.executed_count(),
                plan.len(),
                next
            );
            return CampaignUpdate {
                plan: Some(plan),
                current_step: Some(CurrentStep::Run(next)),
                ..CampaignUpdate::default()
            };
        }

        match &self.review {
            Some(review) if !state.reviewed => {
                self.review_exhausted(state, plan, review.as_ref()).await
            }
            _ => Self::complete(plan),
        }
    }

    async fn review_exhausted(
        &self,
        state: &CampaignState,
        mut plan: Plan,
        review: &dyn CompletionReview,
    ) -> CampaignUpdate {
        let mut view = state.clone();
        view.plan = plan.clone();

        let proposed = match review.review(&view).await {
            Ok(steps) => steps,
            Err(e) => {
                warn!("[ROUTER] Completion review failed, ending workflow: {}", e);
                Vec::new()
            }
        };

        // Research cannot follow synthesis that has already run.
        let synthesis_ran = plan.kinds().any(|kind| !kind.is_research());
        let mut fresh: Vec<StepKind> = Vec::new();
        for kind in proposed {
            if plan.contains(kind) {
                continue;
            }
            if synthesis_ran && kind.is_research() {
                debug!("[ROUTER] Dropping review step '{}' after synthesis", kind);
                continue;
            }
            fresh.push(kind);
        }
        let (added, _) = repair_order(&fresh);

        let Some(&first) = added.first() else {
            let mut update = Self::complete(plan);
            update.reviewed = Some(true);
            return update;
        };

        plan.extend(added.iter().copied());
        info!("[ROUTER] Completion review appended {:?}", added);

        let names: Vec<&str> = added.iter().map(StepKind::as_str).collect();
        CampaignUpdate {
            plan: Some(plan),
            current_step: Some(CurrentStep::Run(first)),
            reviewed: Some(true),
            ..CampaignUpdate::default()
        }
        .with_message(Message::system(format!(
            "Completion review added steps: {}",
            names.join(", ")
        )))
    }

    fn complete(plan: Plan) -> CampaignUpdate {
        info!("[ROUTER] All {} planned step(s) executed", plan.len());
        CampaignUpdate {
            plan: Some(plan),
            ..CampaignUpdate::end_with(Message::system(COMPLETION_MESSAGE))
        }
    }
}
