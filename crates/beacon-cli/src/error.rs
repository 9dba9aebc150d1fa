use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] beacon_core::ConfigError),

    #[error(transparent)]
    Api(#[from] beacon_core::ApiError),

    #[error("discovery failed: {0}")]
    Discovery(#[from] beacon_core::DiscoveryFailure),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Discovery(_) => 3,
            Self::Api(_) => 4,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
