use outreach_agent::{agent::Agent, api::start_server, config::AgentConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();
    let config = AgentConfig::from_env();

    if config.gemini_api_key.is_none() {
        eprintln!("GEMINI_API_KEY not set; /api/run will fail until it is configured");
    }

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Outreach Research Agent - API server");
    info!("Port: {}", api_port);

    let (agent, registry) = Agent::from_config(&config)?;

    info!("agent initialized, starting API server");

    start_server(Arc::new(agent), registry, api_port).await?;

    Ok(())
}
