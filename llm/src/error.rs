//! LLM client errors
//!
//! Timeout, network failure, and upstream HTTP error are distinct
//! kinds: a timeout must never be reported as a malformed response,
//! and an upstream error must carry the status code it answered with.

use caseguard_core::CoachError;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Bounded wait exceeded; the call was aborted
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (refused, DNS, reset)
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Upstream rejected the credential (401/403)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Client misconfiguration, caught before any network call
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Response body did not have the expected completion shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("connection failed: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for CoachError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => CoachError::UpstreamTimeout,
            LlmError::Network(msg) => CoachError::UpstreamNetwork(msg),
            LlmError::Http { status, message } => CoachError::UpstreamHttp { status, message },
            LlmError::Auth(msg) => CoachError::UpstreamAuth(msg),
            LlmError::Configuration(msg) => CoachError::Internal(msg),
            LlmError::InvalidResponse(msg) => CoachError::MalformedModelOutput(msg),
        }
    }
}
