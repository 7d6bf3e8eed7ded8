use loan_obligation_tracker::{api::start_server, config::TrackerConfig, tracker::ObligationTracker};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Loads .env as well
    let config = TrackerConfig::from_env()?;

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Loan Obligation Tracker - API Server");
    info!("Port: {}", api_port);

    let tracker = Arc::new(ObligationTracker::new(config)?);

    info!(
        rules = tracker.extractor().patterns().rule_count(),
        "Tracker initialized"
    );

    start_server(tracker, api_port).await?;

    Ok(())
}
