/*
secdigest - daily security intelligence digest.
Collects CVEs and security news, summarizes each item for three professional
personas via an LLM with model fallback, and publishes entries to Notion.
Intended to run once per invocation from an external scheduler.
*/

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use secdigest::collector::{default_sources, FeedCollector, GITHUB_ADVISORIES_URL};
use secdigest::config::{AiConfig, Credentials};
use secdigest::llm::remote::GroqClient;
use secdigest::pipeline::Pipeline;
use secdigest::publisher::{NotionPublisher, NOTION_API_URL};
use secdigest::summarizer::Summarizer;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Parser, Debug)]
#[command(name = "secdigest", about = "Security intelligence digest batch job")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Credential checks come before any network activity; a missing mandatory
    // secret aborts the run with a non-zero exit.
    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "missing mandatory credentials");
            return Err(e);
        }
    };

    let ai_config = AiConfig::load_or_default(&args.config).await;
    info!(model = %ai_config.model, fallbacks = ai_config.fallback_models.len(), "configuration loaded");

    let collector = FeedCollector::new(
        default_sources(),
        GITHUB_ADVISORIES_URL,
        credentials.github_token.clone(),
    )?;

    let client = GroqClient::new(GROQ_API_URL, credentials.groq_api_key.clone())?;
    let summarizer = Summarizer::new(
        Box::new(client),
        ai_config.models(),
        ai_config.temperature,
        ai_config.max_tokens,
    );

    let publisher = NotionPublisher::new(
        NOTION_API_URL,
        credentials.notion_api_key.clone(),
        credentials.notion_database_id.clone(),
    )?;

    let mut pipeline = Pipeline::new(collector, summarizer, publisher);

    match pipeline.run().await {
        Ok(processed) => {
            info!(processed, "security intelligence digest completed");
            Ok(())
        }
        Err(e) => {
            error!(%e, "fatal error in digest run");
            Err(e)
        }
    }
}
