use beacon_core::ClientConfig;

use crate::error::CliError;

/// Sweep every candidate, in registry order, and report each outcome.
///
/// Unlike discovery this does not stop at the first healthy endpoint; it is
/// the "why can't my device see the server" report.
pub async fn run(config: &ClientConfig) -> Result<(), CliError> {
    let discovery = super::discovery_for(config)?;

    let mut healthy = 0usize;
    for candidate in discovery.registry().candidates() {
        let result = discovery.probe().probe(candidate.base_url()).await;
        if result.outcome.is_ok() {
            healthy += 1;
        }
        println!(
            "{:<9} {:<32} {:<12} {} ms",
            candidate.role().as_str(),
            candidate.base_url(),
            result.outcome.label(),
            result.latency.as_millis()
        );
    }

    println!(
        "\n{healthy}/{} candidate(s) healthy",
        discovery.registry().len()
    );
    Ok(())
}
