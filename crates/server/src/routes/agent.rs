use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use campaign::{CampaignRequest, format_campaign_output};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AgentQueryPayload {
    pub prompt: String,
    #[serde(default)]
    pub synthesize_speech: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentQueryResponse {
    pub formatted_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_audio_base64: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/agent/query", post(query_agent))
}

/// Run one campaign request to completion and render it
pub async fn query_agent(
    State(state): State<AppState>,
    payload: Result<Json<AgentQueryPayload>, JsonRejection>,
) -> Result<Json<AgentQueryResponse>, ApiError> {
    let Json(payload) = payload?;
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt must not be empty".to_string()));
    }

    tracing::info!(
        "[API] Campaign query received ({} chars, speech: {})",
        payload.prompt.len(),
        payload.synthesize_speech
    );

    let request =
        CampaignRequest::new(payload.prompt).with_speech(payload.synthesize_speech);

    // A panic inside the run surfaces as a JoinError instead of tearing down the connection.
    let workflow = state.workflow.clone();
    let final_state = tokio::spawn(async move { workflow.run(request).await })
        .await
        .map_err(|e| ApiError::InternalError(format!("Internal Processing Error: {}", e)))??;

    Ok(Json(AgentQueryResponse {
        formatted_output: format_campaign_output(&final_state),
        speech_audio_base64: final_state.speech.map(|clip| clip.audio_base64),
    }))
}
