//! Gemini text-to-speech client

use std::time::Instant;

use base64::engine::{Engine, general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini TTS always answers with 16-bit mono PCM at 24 kHz.
pub const GEMINI_SAMPLE_RATE: u32 = 24_000;
pub const GEMINI_CHANNELS: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("TTS error: {0}")]
    TTSError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Audio decode error: {0}")]
    DecodeError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub api_key: String,
    pub model: String,
    pub voice_name: String,
}

impl SpeechConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-2.5-flash-preview-tts".to_string(),
            voice_name: "Kore".to_string(),
        }
    }
}

/// Raw synthesized audio
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub processing_time_ms: u64,
}

impl SpeechAudio {
    pub fn duration_ms(&self) -> u64 {
        let bytes_per_second = self.sample_rate as u64 * self.channels as u64 * 2;
        if bytes_per_second == 0 {
            return 0;
        }
        self.pcm.len() as u64 * 1000 / bytes_per_second
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSpeechClient {
    config: SpeechConfig,
    client: Client,
    base_url: String,
}

impl GeminiSpeechClient {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn voice_name(&self) -> &str {
        &self.config.voice_name
    }

    pub async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        let start_time = Instant::now();

        info!(
            "[SPEECH] Synthesizing {} chars with Gemini voice {}",
            text.len(),
            self.config.voice_name
        );

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.config.voice_name }
                    }
                }
            }
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.config.model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::TTSError(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let encoded = body["candidates"][0]["content"]["parts"][0]["inlineData"]["data"]
            .as_str()
            .ok_or_else(|| SpeechError::TTSError("Gemini response carried no audio".to_string()))?;

        let pcm = STANDARD
            .decode(encoded)
            .map_err(|e| SpeechError::DecodeError(e.to_string()))?;

        Ok(SpeechAudio {
            pcm,
            sample_rate: GEMINI_SAMPLE_RATE,
            channels: GEMINI_CHANNELS,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
