pub mod error;
pub mod routes;

use std::sync::Arc;

use campaign::CampaignWorkflow;

/// Shared handler state. The workflow holds only immutable, shareable
/// dependencies, so every request drives its own run over the same instance.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<CampaignWorkflow>,
}

impl AppState {
    pub fn new(workflow: CampaignWorkflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
        }
    }
}
