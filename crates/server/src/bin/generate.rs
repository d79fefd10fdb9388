//! One-shot campaign generation from the terminal

use anyhow::{Context, Result};
use campaign::{CampaignConfig, CampaignRequest, CampaignWorkflow, format_campaign_output};
use clap::Parser;

/// Plan and run a marketing campaign request in-process
#[derive(Parser)]
#[command(name = "generate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run one campaign request and print the result")]
struct Cli {
    /// Free-text campaign request
    prompt: String,

    /// Synthesize the script to speech once the plan completes
    #[arg(long)]
    speech: bool,

    /// Print the final state as JSON instead of the formatted summary
    #[arg(long)]
    json: bool,

    /// Override the LLM model
    #[arg(long, env = "CAMPAIGN_LLM_MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    utils::logging::init();

    let cli = Cli::parse();

    let mut config = CampaignConfig::from_env().context("Failed to load campaign configuration")?;
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    let workflow = CampaignWorkflow::from_config(&config);
    let state = workflow
        .run(CampaignRequest::new(cli.prompt).with_speech(cli.speech))
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", format_campaign_output(&state));
    }

    Ok(())
}
