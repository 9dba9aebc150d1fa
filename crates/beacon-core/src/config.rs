//! Client configuration.
//!
//! The configuration owns the ordered candidate list and the two timeout
//! knobs; everything else is derived. Defaults reproduce the deployment the
//! original frontend shipped with: a LAN primary, the Android emulator
//! loopback alias as backup, localhost, and two historical addresses kept as
//! static fallbacks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::{CandidateEndpoint, CandidateRegistry, EndpointRole};

const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Candidate URLs and timeouts for one client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Configured primary base URL; also the fail-open default.
    pub primary_url: String,

    #[serde(default)]
    pub backup_url: Option<String>,

    #[serde(default)]
    pub localhost_url: Option<String>,

    /// Hardcoded historical addresses tried last, in listed order.
    #[serde(default)]
    pub static_fallbacks: Vec<String>,

    /// Bound for discovery probes.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Bound for payload-bearing API calls.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_url: String::from("http://192.168.18.29:5000"),
            backup_url: Some(String::from("http://10.0.2.2:5000")),
            localhost_url: Some(String::from("http://localhost:5000")),
            static_fallbacks: vec![
                String::from("http://127.0.0.1:5000"),
                String::from("http://192.168.18.146:5000"),
            ],
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Validate the configured URLs into an ordered registry.
    ///
    /// Order is fixed: primary, backup, localhost, then static fallbacks in
    /// listed order.
    pub fn registry(&self) -> Result<CandidateRegistry, ConfigError> {
        let mut candidates = Vec::new();
        candidates.push(CandidateEndpoint::new(
            &self.primary_url,
            EndpointRole::Primary,
        )?);
        if let Some(url) = &self.backup_url {
            candidates.push(CandidateEndpoint::new(url, EndpointRole::Backup)?);
        }
        if let Some(url) = &self.localhost_url {
            candidates.push(CandidateEndpoint::new(url, EndpointRole::Localhost)?);
        }
        for url in &self.static_fallbacks {
            candidates.push(CandidateEndpoint::new(url, EndpointRole::Static)?);
        }
        CandidateRegistry::new(candidates)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_registry_in_precedence_order() {
        let registry = ClientConfig::default().registry().expect("valid registry");
        let roles: Vec<EndpointRole> = registry
            .candidates()
            .iter()
            .map(|candidate| candidate.role())
            .collect();
        assert_eq!(
            roles,
            vec![
                EndpointRole::Primary,
                EndpointRole::Backup,
                EndpointRole::Localhost,
                EndpointRole::Static,
                EndpointRole::Static,
            ]
        );
        assert_eq!(registry.primary().base_url(), "http://192.168.18.29:5000");
    }

    #[test]
    fn invalid_candidate_url_is_fatal() {
        let config = ClientConfig {
            primary_url: String::from("not a url"),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.registry(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn timeouts_default_when_omitted_from_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"primary_url": "http://192.168.1.7:5000"}"#)
                .expect("minimal config parses");

        assert_eq!(config.probe_timeout(), Duration::from_millis(3_000));
        assert_eq!(config.request_timeout(), Duration::from_millis(60_000));
        assert!(config.backup_url.is_none());

        let registry = config.registry().expect("single candidate is enough");
        assert_eq!(registry.len(), 1);
    }
}
