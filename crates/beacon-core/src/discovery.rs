//! Ordered discovery sweeps over the candidate registry.
//!
//! A discovery pass probes candidates strictly in registry order, one at a
//! time, and stops at the first healthy one. Sequential probing is
//! deliberate: racing candidates in parallel would let a slow-but-reachable
//! primary lose to the localhost fallback on an emulator, inverting the
//! configured precedence.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use crate::probe::{HealthProbe, ProbeOutcome};
use crate::registry::{CandidateEndpoint, CandidateRegistry};

/// One probed-and-rejected candidate within a discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub candidate: CandidateEndpoint,
    pub outcome: ProbeOutcome,
    pub latency: Duration,
}

/// A completed discovery pass that found a healthy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredEndpoint {
    /// The first candidate, in registry order, whose probe passed.
    pub candidate: CandidateEndpoint,
    /// Candidates probed and rejected before the winner.
    pub rejected: Vec<ProbeAttempt>,
    /// Latency of the winning probe.
    pub latency: Duration,
}

/// Every candidate was probed once and none passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFailure {
    pub attempts: Vec<ProbeAttempt>,
}

impl Display for DiscoveryFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "no reachable backend among {} candidate(s):", self.attempts.len())?;
        for attempt in &self.attempts {
            write!(
                f,
                " {} [{}] -> {};",
                attempt.candidate.base_url(),
                attempt.candidate.role().as_str(),
                attempt.outcome.label()
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for DiscoveryFailure {}

/// Finds the first healthy candidate in registry order.
#[derive(Clone)]
pub struct EndpointDiscovery {
    registry: Arc<CandidateRegistry>,
    probe: HealthProbe,
}

impl EndpointDiscovery {
    pub fn new(registry: Arc<CandidateRegistry>, probe: HealthProbe) -> Self {
        Self { registry, probe }
    }

    pub fn registry(&self) -> &CandidateRegistry {
        &self.registry
    }

    pub fn probe(&self) -> &HealthProbe {
        &self.probe
    }

    /// Run one discovery pass.
    ///
    /// Probes are issued strictly in registry order and the sweep stops at
    /// the first `ok`, so exactly k probes are issued when candidate k wins.
    /// A candidate that failed its probe is never returned by the same pass.
    pub async fn discover(&self) -> Result<DiscoveredEndpoint, DiscoveryFailure> {
        let mut rejected = Vec::new();

        for candidate in self.registry.candidates() {
            let result = self.probe.probe(candidate.base_url()).await;
            if result.outcome.is_ok() {
                tracing::info!(
                    base_url = candidate.base_url(),
                    role = candidate.role().as_str(),
                    rejected = rejected.len(),
                    "discovery selected endpoint"
                );
                return Ok(DiscoveredEndpoint {
                    candidate: candidate.clone(),
                    rejected,
                    latency: result.latency,
                });
            }
            rejected.push(ProbeAttempt {
                candidate: candidate.clone(),
                outcome: result.outcome,
                latency: result.latency,
            });
        }

        let failure = DiscoveryFailure { attempts: rejected };
        tracing::warn!(%failure, "discovery exhausted all candidates");
        Err(failure)
    }

    /// Discovery with the fail-open policy: on full exhaustion, hand back
    /// the configured primary anyway so the caller has *some* URL to attempt
    /// and can surface a real error instead of stalling.
    pub async fn discover_or_primary(&self) -> (CandidateEndpoint, Option<DiscoveryFailure>) {
        match self.discover().await {
            Ok(found) => (found.candidate, None),
            Err(failure) => (self.registry.primary().clone(), Some(failure)),
        }
    }
}
