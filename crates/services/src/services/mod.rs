//! External provider clients
//!
//! Each client wraps exactly one vendor API and knows nothing about campaigns.
//! Callers own retries, pacing and fallbacks.

pub mod research;
pub mod speech;
pub mod trends;

pub use research::{SearchError, SearchResponse, SearchResult, WebSearchConfig, WebSearchProvider};
pub use speech::{GeminiSpeechClient, SpeechAudio, SpeechConfig, SpeechError};
pub use trends::{OrganicResult, TrendLookupClient, TrendLookupResponse};
