//! Narrated pitch of the finished script

use async_trait::async_trait;
use base64::engine::{general_purpose::STANDARD, Engine};
use services::services::GeminiSpeechClient;
use tracing::{info, warn};

use super::Capability;
use crate::workflow::types::{CampaignState, CampaignUpdate, CapabilityKind, Message, SpeechClip};

pub const MISSING_KEY_MESSAGE: &str = "GEMINI_API_KEY not set. Cannot synthesize speech.";
pub const MISSING_SCRIPT_MESSAGE: &str = "No script available for speech synthesis.";

pub struct SpeechSynthesizer {
    client: Option<GeminiSpeechClient>,
}

impl SpeechSynthesizer {
    pub fn new(client: Option<GeminiSpeechClient>) -> Self {
        Self { client }
    }

    fn pitch_prompt(script: &str) -> String {
        format!(
            "TTS the following script for a marketing campaign. \
             Make it sound like you are a person pitching the idea of the script! SCRIPT:\n {}",
            script
        )
    }
}

#[async_trait]
impl Capability for SpeechSynthesizer {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::SpeechSynthesizer
    }

    async fn execute(&self, state: &CampaignState) -> CampaignUpdate {
        if state.script.trim().is_empty() {
            return CampaignUpdate::default().with_message(Message::assistant(MISSING_SCRIPT_MESSAGE));
        }

        let Some(client) = &self.client else {
            warn!("[SPEECH] {}", MISSING_KEY_MESSAGE);
            return CampaignUpdate::default().with_message(Message::assistant(MISSING_KEY_MESSAGE));
        };

        match client.synthesize(&Self::pitch_prompt(&state.script)).await {
            Ok(audio) => {
                let duration_ms = audio.duration_ms();
                info!(
                    "[SPEECH] {} bytes of audio ({} ms) in {} ms with voice {}",
                    audio.pcm.len(),
                    duration_ms,
                    audio.processing_time_ms,
                    client.voice_name()
                );

                let clip = SpeechClip {
                    audio_base64: STANDARD.encode(&audio.pcm),
                    sample_rate: audio.sample_rate,
                    channels: audio.channels,
                    byte_len: audio.pcm.len(),
                };
                CampaignUpdate {
                    speech: Some(clip),
                    ..CampaignUpdate::default()
                }
                .with_message(Message::assistant(format!(
                    "Converted the script to speech for the campaign ({:.1}s of audio).",
                    duration_ms as f64 / 1000.0
                )))
            }
            Err(e) => {
                warn!("[SPEECH] Synthesis failed: {}", e);
                CampaignUpdate::default()
                    .with_message(Message::assistant(format!("Error synthesizing speech: {}", e)))
            }
        }
    }
}
