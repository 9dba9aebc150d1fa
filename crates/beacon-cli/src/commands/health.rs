use beacon_core::ClientConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Resilient health check through the full cached-attempt/fallback path.
pub async fn run(config: &ClientConfig, cli: &Cli) -> Result<(), CliError> {
    let client = super::client_for(config, cli)?;
    let report = client.check_health().await?;

    println!("status:        {}", report.status);
    if let Some(timestamp) = &report.timestamp {
        println!("timestamp:     {timestamp}");
    }
    if let Some(mongodb) = report.mongodb {
        println!("mongodb:       {mongodb}");
    }
    if let Some(model_manager) = report.model_manager {
        println!("model manager: {model_manager}");
    }
    Ok(())
}
