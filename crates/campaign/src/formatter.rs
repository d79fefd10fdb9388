//! Human-readable rendering of a finished campaign run

use crate::workflow::types::CampaignState;

const MAX_TRENDS: usize = 5;
const MAX_RESULT_SETS: usize = 2;
const MAX_ITEMS_PER_SET: usize = 2;
const TAIL_MESSAGES: usize = 3;

pub fn format_campaign_output(state: &CampaignState) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=== 📣 Campaign Overview ===".to_string());
    lines.push(format!("🎯 Theme: {}", state.campaign_theme));
    lines.push(format!("👥 Target Audience: {}", state.target_audience));
    lines.push(format!("🕒 Duration: {} seconds", state.duration_seconds));
    lines.push(format!("🗣️ Tone: {}", state.tone));
    lines.push(format!("📍 Current Step: {}", state.current_step));
    lines.push(String::new());

    if !state.trends.is_empty() {
        lines.push("📈 Top Trends:".to_string());
        for trend in state.trends.iter().take(MAX_TRENDS) {
            lines.push(format!(
                "  - {} ({}, relevance: {})",
                trend.keyword, trend.trend_direction, trend.relevance
            ));
        }
        lines.push(String::new());
    }

    if !state.search_results.is_empty() {
        lines.push("🔍 Search Results:".to_string());
        for set in state.search_results.iter().take(MAX_RESULT_SETS) {
            lines.push(format!("  🔹 Term: {}", set.term));
            for item in set.results.iter().take(MAX_ITEMS_PER_SET) {
                let score = item
                    .score
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "n/a".to_string());
                lines.push(format!("     - {} (score: {})", item.title, score));
                lines.push(format!("       {}", item.url));
            }
        }
        lines.push(String::new());
    }

    if !state.hashtags.is_empty() {
        lines.push("🏷️ Hashtags:".to_string());
        lines.push(format!("  {}", state.hashtags.join(", ")));
        lines.push(String::new());
    }

    if !state.script.is_empty() {
        lines.push("🎬 Script:".to_string());
        lines.push(state.script.clone());
        lines.push(String::new());
    }

    if !state.production_ideas.is_empty() {
        lines.push("💡 Production Ideas:".to_string());
        for idea in &state.production_ideas {
            lines.push(format!("  - {}", idea));
        }
        lines.push(String::new());
    }

    if let Some(clip) = &state.speech {
        let channels = if clip.channels == 1 { "mono" } else { "stereo" };
        lines.push(format!(
            "🔊 Speech: {:.1}s of audio ({} Hz, {})",
            clip.duration_ms() as f64 / 1000.0,
            clip.sample_rate,
            channels
        ));
        lines.push(String::new());
    }

    if !state.messages.is_empty() {
        lines.push("📨 Messages:".to_string());
        let skip = state.messages.len().saturating_sub(TAIL_MESSAGES);
        for msg in &state.messages[skip..] {
            lines.push(format!("  - [{}] {}", msg.role, msg.content));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
