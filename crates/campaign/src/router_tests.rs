//! Router behaviour: plan walking, termination and the completion review

use std::sync::Arc;

use serde_json::json;

use crate::{
    test_support::{classification_json, scripted_llm, FixedReview},
    workflow::{
        planner::{Planner, MISSING_THEME_MESSAGE, repair_order},
        router::{Router, COMPLETION_MESSAGE},
        types::{CampaignState, CurrentStep, Message, Plan, Role, StepKind},
    },
};

fn router_with_replies(replies: Vec<&str>) -> Router {
    Router::new(Planner::new(scripted_llm(replies)))
}

fn idle_router() -> Router {
    router_with_replies(vec![])
}

/// A state whose plan was just created, positioned on its first step
fn running_state(kinds: &[StepKind]) -> CampaignState {
    let mut state = CampaignState::new("prompt");
    state.campaign_theme = "theme".to_string();
    state.plan = Plan::new(kinds.iter().copied());
    state.current_step = match state.plan.next_pending() {
        Some(kind) => CurrentStep::Run(kind),
        None => CurrentStep::End,
    };
    state
}

/// Every sequence over the four tags of length 0..=max_len, repeats included
fn all_plans(max_len: usize) -> Vec<Vec<StepKind>> {
    let mut plans = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for kind in StepKind::ALL {
                let mut plan: Vec<StepKind> = prefix.clone();
                plan.push(kind);
                next.push(plan);
            }
        }
        plans.extend(next.iter().cloned());
        frontier = next;
    }
    plans
}

#[test]
fn plan_enumeration_is_exhaustive() {
    assert_eq!(all_plans(4).len(), 1 + 4 + 16 + 64 + 256);
}

#[tokio::test]
async fn walks_every_plan_in_order_then_terminates() {
    let router = idle_router();

    for kinds in all_plans(4) {
        let mut state = running_state(&kinds);
        if kinds.is_empty() {
            assert_eq!(state.current_step, CurrentStep::End);
            continue;
        }

        for call in 1..=kinds.len() {
            let before = state.messages.clone();
            let update = router.route(&state).await;
            state.apply(update);

            // Log is append-only.
            assert!(state.messages.len() >= before.len());
            assert_eq!(&state.messages[..before.len()], before.as_slice());

            // Exactly the first `call` steps are executed, in plan order.
            let flags: Vec<bool> = state.plan.steps().iter().map(|s| s.executed).collect();
            let expected: Vec<bool> = (0..kinds.len()).map(|i| i < call).collect();
            assert_eq!(flags, expected, "plan {:?} after call {}", kinds, call);

            // Plan order never changes.
            assert_eq!(state.plan.kinds().collect::<Vec<_>>(), kinds);

            if call < kinds.len() {
                assert_eq!(state.current_step, CurrentStep::Run(kinds[call]));
                assert_eq!(state.messages.len(), before.len());
            } else {
                assert_eq!(state.current_step, CurrentStep::End);
                assert_eq!(
                    state.messages.last(),
                    Some(&Message::system(COMPLETION_MESSAGE))
                );
            }
        }
    }
}

#[tokio::test]
async fn terminal_state_is_a_no_op() {
    let router = idle_router();
    let mut state = running_state(&[StepKind::TrendAnalyzer]);
    let update = router.route(&state).await;
    state.apply(update);
    assert!(state.is_terminal());

    let update = router.route(&state).await;
    assert!(update.is_empty());

    let before = state.clone();
    state.apply(update);
    assert_eq!(state, before);
}

#[tokio::test]
async fn unplanned_state_delegates_to_planner() {
    let reply = classification_json(
        "sustainable fashion",
        &["trend_analyzer", "search_engine", "hashtag_generator", "script_generator"],
    );
    let router = router_with_replies(vec![&reply]);
    let mut state = CampaignState::new(
        "Create a complete campaign about sustainable fashion for Gen Z with a humorous tone",
    );

    let update = router.route(&state).await;
    state.apply(update);

    assert_eq!(state.campaign_theme, "sustainable fashion");
    assert_eq!(state.plan.len(), 4);
    assert_eq!(state.plan.executed_count(), 0);
    assert_eq!(state.current_step, CurrentStep::Run(StepKind::TrendAnalyzer));
    assert_eq!(state.messages.len(), 2);
}

#[tokio::test]
async fn missing_theme_is_terminal_after_one_call() {
    let reply = json!({"parameters": {}, "plan": []}).to_string();
    let router = router_with_replies(vec![&reply]);
    let mut state = CampaignState::new("hello");

    let update = router.route(&state).await;
    state.apply(update);

    assert!(state.is_terminal());
    assert!(state.plan.is_empty());
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[1], Message::assistant(MISSING_THEME_MESSAGE));
}

#[tokio::test]
async fn partial_plan_dispatches_exactly_its_steps() {
    let router = idle_router();
    let mut state = running_state(&[StepKind::TrendAnalyzer, StepKind::ScriptGenerator]);
    let mut visited = vec![state.current_step];

    while !state.is_terminal() {
        let update = router.route(&state).await;
        state.apply(update);
        visited.push(state.current_step);
    }

    assert_eq!(
        visited,
        vec![
            CurrentStep::Run(StepKind::TrendAnalyzer),
            CurrentStep::Run(StepKind::ScriptGenerator),
            CurrentStep::End
        ]
    );
    assert!(state.plan.is_complete());
}

#[tokio::test]
async fn completed_step_missing_from_plan_still_advances() {
    let router = idle_router();
    let mut state = running_state(&[StepKind::SearchEngine]);
    state.current_step = CurrentStep::Run(StepKind::HashtagGenerator);

    let update = router.route(&state).await;
    state.apply(update);

    assert_eq!(state.plan.executed_count(), 0);
    assert_eq!(state.current_step, CurrentStep::Run(StepKind::SearchEngine));
}

#[tokio::test]
async fn review_appends_only_new_steps_once() {
    let review = Arc::new(FixedReview::new(Ok(vec![
        StepKind::TrendAnalyzer,
        StepKind::HashtagGenerator,
        StepKind::HashtagGenerator,
    ])));
    let router = idle_router().with_review(review.clone());
    let mut state = running_state(&[StepKind::TrendAnalyzer]);

    let update = router.route(&state).await;
    state.apply(update);

    assert_eq!(
        state.plan.kinds().collect::<Vec<_>>(),
        vec![StepKind::TrendAnalyzer, StepKind::HashtagGenerator]
    );
    assert_eq!(state.current_step, CurrentStep::Run(StepKind::HashtagGenerator));
    assert!(state.reviewed);
    assert_eq!(state.messages.last().unwrap().role, Role::System);

    let update = router.route(&state).await;
    state.apply(update);

    assert!(state.is_terminal());
    assert!(state.plan.is_complete());
    assert_eq!(review.times_asked(), 1);
    assert_eq!(
        state.messages.last(),
        Some(&Message::system(COMPLETION_MESSAGE))
    );
}

#[tokio::test]
async fn review_cannot_add_research_after_synthesis() {
    let review = Arc::new(FixedReview::new(Ok(vec![
        StepKind::TrendAnalyzer,
        StepKind::SearchEngine,
    ])));
    let router = idle_router().with_review(review.clone());
    let mut state = running_state(&[StepKind::HashtagGenerator]);

    let update = router.route(&state).await;
    state.apply(update);

    assert!(state.is_terminal());
    assert_eq!(
        state.plan.kinds().collect::<Vec<_>>(),
        vec![StepKind::HashtagGenerator]
    );
    assert_eq!(review.times_asked(), 1);
}

#[tokio::test]
async fn review_additions_keep_research_first() {
    let review = Arc::new(FixedReview::new(Ok(vec![
        StepKind::ScriptGenerator,
        StepKind::SearchEngine,
    ])));
    let router = idle_router().with_review(review);
    let mut state = running_state(&[StepKind::TrendAnalyzer]);

    let update = router.route(&state).await;
    state.apply(update);

    let kinds: Vec<StepKind> = state.plan.kinds().collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::TrendAnalyzer,
            StepKind::SearchEngine,
            StepKind::ScriptGenerator
        ]
    );
    assert!(!repair_order(&kinds).1);
    assert_eq!(state.current_step, CurrentStep::Run(StepKind::SearchEngine));
}

#[tokio::test]
async fn review_failure_ends_normally() {
    let review = Arc::new(FixedReview::new(Err("model offline".to_string())));
    let router = idle_router().with_review(review.clone());
    let mut state = running_state(&[StepKind::SearchEngine]);

    let update = router.route(&state).await;
    state.apply(update);

    assert!(state.is_terminal());
    assert!(state.reviewed);
    assert_eq!(state.plan.len(), 1);
    assert_eq!(review.times_asked(), 1);
    assert_eq!(
        state.messages.last(),
        Some(&Message::system(COMPLETION_MESSAGE))
    );
}

#[tokio::test]
async fn review_with_nothing_new_ends_normally() {
    let review = Arc::new(FixedReview::new(Ok(vec![StepKind::SearchEngine])));
    let router = idle_router().with_review(review);
    let mut state = running_state(&[StepKind::SearchEngine]);

    let update = router.route(&state).await;
    state.apply(update);

    assert!(state.is_terminal());
    assert_eq!(state.plan.len(), 1);
}

#[tokio::test]
async fn llm_review_parses_new_steps() {
    use crate::workflow::review::{CompletionReview, LlmCompletionReview};

    let llm = scripted_llm(vec![
        r#"{"new_steps": ["script_generator", {"step": "hashtag_generator"}, "juggler"]}"#,
    ]);
    let steps = LlmCompletionReview::new(llm)
        .review(&running_state(&[StepKind::TrendAnalyzer]))
        .await
        .unwrap();

    assert_eq!(
        steps,
        vec![StepKind::ScriptGenerator, StepKind::HashtagGenerator]
    );
}
