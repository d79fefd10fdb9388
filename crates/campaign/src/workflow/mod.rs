//! Campaign workflow: planning, step routing and the driver loop

pub mod driver;
pub mod planner;
pub mod review;
pub mod router;
pub mod types;

pub use driver::CampaignWorkflow;
pub use planner::{repair_order, Classification, Planner, MISSING_THEME_MESSAGE};
pub use review::{CompletionReview, LlmCompletionReview};
pub use router::{Router, COMPLETION_MESSAGE};
pub use types::{
    CampaignRequest, CampaignState, CampaignUpdate, CapabilityKind, CurrentStep, Message, Plan,
    Role, SearchHit, SearchResultSet, SpeechClip, Step, StepKind, Trend, TrendDirection,
    END_MARKER,
};
