use anyhow::Context;
use campaign::{CampaignConfig, CampaignWorkflow, ProviderType};
use server::{AppState, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from `.env` if present so local development picks up API keys
    dotenv::dotenv().ok();
    utils::logging::init();

    let config = CampaignConfig::from_env().context("Failed to load campaign configuration")?;
    log_credentials(&config);

    let app_router = routes::router(AppState::new(CampaignWorkflow::from_config(&config)));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or_else(|| {
            tracing::info!("No PORT environment variable set, using 8000");
            8000
        });
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router).await?;
    Ok(())
}

/// Report which providers are usable without printing any key material.
fn log_credentials(config: &CampaignConfig) {
    let providers = [
        (
            "OpenAI",
            config.openai_api_key.is_some() || config.llm.provider == ProviderType::Ollama,
        ),
        ("SerpAPI", config.serpapi_key.is_some()),
        ("Tavily", config.tavily_api_key.is_some()),
        ("Gemini", config.gemini_api_key.is_some()),
    ];
    for (name, present) in providers {
        if present {
            tracing::info!("{} credentials configured", name);
        } else {
            tracing::warn!("{} credentials missing, related steps will degrade", name);
        }
    }
    tracing::info!(
        "LLM provider: {} (model {})",
        config.llm.provider,
        config.llm.model
    );
}
