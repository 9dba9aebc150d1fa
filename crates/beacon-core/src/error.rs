use thiserror::Error;

/// Classified outcome of a dispatched API call.
///
/// Only the connection-level variants (`Timeout`, `Unreachable`) are ever
/// eligible for candidate fallback. An HTTP error means the server was
/// reached and answered, so switching servers would only mask the real
/// failure; a malformed response means the payload is broken, which a
/// different server will not fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("cannot reach the server at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("server error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("server returned unexpected data: {message}")]
    MalformedResponse { message: String },
}

impl ApiError {
    /// True for failures that happened before any HTTP response arrived.
    pub const fn is_connection_level(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unreachable { .. })
    }

    /// HTTP status code when the server answered, `None` otherwise.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Fatal construction-time configuration errors.
///
/// These are not per-call conditions: a client with no valid candidates
/// cannot be built at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("candidate URL '{value}' is not a valid absolute HTTP(S) origin: {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("candidate registry cannot be empty")]
    EmptyRegistry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_level_covers_timeout_and_unreachable_only() {
        let timeout = ApiError::Timeout {
            url: String::from("http://10.0.2.2:5000"),
        };
        let unreachable = ApiError::Unreachable {
            url: String::from("http://10.0.2.2:5000"),
            message: String::from("connection refused"),
        };
        let http = ApiError::Http {
            status: 401,
            message: String::from("Invalid credentials"),
        };
        let malformed = ApiError::MalformedResponse {
            message: String::from("expected value at line 1"),
        };

        assert!(timeout.is_connection_level());
        assert!(unreachable.is_connection_level());
        assert!(!http.is_connection_level());
        assert!(!malformed.is_connection_level());
    }

    #[test]
    fn http_error_exposes_status() {
        let error = ApiError::Http {
            status: 400,
            message: String::from("bad credentials"),
        };
        assert_eq!(error.status(), Some(400));

        let timeout = ApiError::Timeout {
            url: String::from("http://localhost:5000"),
        };
        assert_eq!(timeout.status(), None);
    }
}
