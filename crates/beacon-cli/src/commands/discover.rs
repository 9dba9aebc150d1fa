use beacon_core::ClientConfig;

use crate::error::CliError;

/// Run one discovery pass and print the selected endpoint.
pub async fn run(config: &ClientConfig) -> Result<(), CliError> {
    let discovery = super::discovery_for(config)?;
    let found = discovery.discover().await?;

    for attempt in &found.rejected {
        println!(
            "rejected  {:<32} {}",
            attempt.candidate.base_url(),
            attempt.outcome.label()
        );
    }
    println!(
        "selected  {:<32} [{}] in {} ms",
        found.candidate.base_url(),
        found.candidate.role().as_str(),
        found.latency.as_millis()
    );
    Ok(())
}
