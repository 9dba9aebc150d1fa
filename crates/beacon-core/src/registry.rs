//! Ordered candidate base URLs for backend discovery.
//!
//! The registry is pure data: an immutable, validated, ordered list of base
//! URLs. Position in the list defines probe and retry precedence (primary,
//! then backup, then localhost, then static historical fallbacks), and that
//! order is the sole tie-break between reachable candidates.

use url::Url;

use crate::error::ConfigError;

/// Where a candidate came from in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Primary,
    Backup,
    Localhost,
    Static,
}

impl EndpointRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Backup => "backup",
            Self::Localhost => "localhost",
            Self::Static => "static",
        }
    }
}

/// One base URL the client may use to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEndpoint {
    base_url: String,
    role: EndpointRole,
}

impl CandidateEndpoint {
    /// Validate and normalize a candidate base URL.
    ///
    /// Accepts only absolute `http`/`https` origins with a host. A trailing
    /// slash is stripped so paths can be appended verbatim.
    pub fn new(url: impl AsRef<str>, role: EndpointRole) -> Result<Self, ConfigError> {
        let raw = url.as_ref().trim();
        let parsed = Url::parse(raw).map_err(|error| ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: error.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                value: raw.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl {
                value: raw.to_string(),
                reason: String::from("missing host"),
            });
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            role,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn role(&self) -> EndpointRole {
        self.role
    }
}

/// Ordered, validated list of candidate endpoints.
///
/// Every call site that performs fallback shares one registry, so probe and
/// retry order cannot diverge between operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRegistry {
    candidates: Vec<CandidateEndpoint>,
}

impl CandidateRegistry {
    /// Build a registry from an already-ordered candidate list.
    ///
    /// An empty list is a configuration error, not a runtime failure mode.
    pub fn new(candidates: Vec<CandidateEndpoint>) -> Result<Self, ConfigError> {
        if candidates.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }
        Ok(Self { candidates })
    }

    /// Candidates in probe/retry precedence order.
    pub fn candidates(&self) -> &[CandidateEndpoint] {
        &self.candidates
    }

    /// The first candidate. Used as the fail-open default when discovery
    /// exhausts every candidate.
    pub fn primary(&self) -> &CandidateEndpoint {
        &self.candidates[0]
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false: construction rejects an empty candidate list.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
