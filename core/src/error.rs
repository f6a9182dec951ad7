//! Request error taxonomy
//!
//! Every failure a route can produce maps onto exactly one of these
//! variants, and every variant maps onto a stable kind string and an
//! HTTP status. Validation failures carry the full violation list so
//! the response can enumerate everything that was wrong, not just the
//! first problem.

use crate::schema::Violation;

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    /// Inbound request body failed schema validation
    #[error("request validation failed ({} violation(s))", .0.len())]
    InputValidation(Vec<Violation>),

    /// External API rejected the supplied credential
    #[error("upstream rejected credential: {0}")]
    UpstreamAuth(String),

    /// Bounded wait on the upstream call was exceeded
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// Connection-level failure reaching the upstream
    #[error("upstream network failure: {0}")]
    UpstreamNetwork(String),

    /// Upstream answered with a non-success HTTP status
    #[error("upstream HTTP {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    /// Model output could not be parsed as JSON
    #[error("model returned invalid JSON: {0}")]
    MalformedModelOutput(String),

    /// Model output parsed but failed the output schema; signals
    /// prompt/schema drift, not a user error
    #[error("model output failed validation ({} violation(s))", .0.len())]
    OutputValidation(Vec<Violation>),

    /// Catch-all for defects and unclassified failures
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoachError {
    /// Stable machine-readable kind used in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            CoachError::InputValidation(_) => "input_validation",
            CoachError::UpstreamAuth(_) => "upstream_auth",
            CoachError::UpstreamTimeout => "upstream_timeout",
            CoachError::UpstreamNetwork(_) => "upstream_network",
            CoachError::UpstreamHttp { .. } => "upstream_http",
            CoachError::MalformedModelOutput(_) => "upstream_malformed_response",
            CoachError::OutputValidation(_) => "output_validation",
            CoachError::Internal(_) => "internal",
        }
    }

    /// HTTP status for the response body
    pub fn status_code(&self) -> u16 {
        match self {
            CoachError::InputValidation(_) => 400,
            CoachError::UpstreamAuth(_) => 401,
            CoachError::UpstreamTimeout
            | CoachError::UpstreamNetwork(_)
            | CoachError::UpstreamHttp { .. } => 502,
            CoachError::MalformedModelOutput(_)
            | CoachError::OutputValidation(_)
            | CoachError::Internal(_) => 500,
        }
    }

    /// Violations to enumerate in the response, when this kind has any
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            CoachError::InputValidation(v) | CoachError::OutputValidation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinct_from_malformed_output() {
        assert_ne!(
            CoachError::UpstreamTimeout.kind(),
            CoachError::MalformedModelOutput("x".to_string()).kind()
        );
    }

    #[test]
    fn test_status_codes() {
        let violations = vec![Violation::new("basics.location", "required field is missing")];
        assert_eq!(CoachError::InputValidation(violations.clone()).status_code(), 400);
        assert_eq!(CoachError::OutputValidation(violations).status_code(), 500);
        assert_eq!(CoachError::UpstreamTimeout.status_code(), 502);
        assert_eq!(CoachError::UpstreamAuth("bad key".to_string()).status_code(), 401);
    }

    #[test]
    fn test_only_validation_kinds_carry_violations() {
        assert!(CoachError::UpstreamTimeout.violations().is_none());
        let err = CoachError::InputValidation(vec![Violation::new("a", "b")]);
        assert_eq!(err.violations().unwrap().len(), 1);
    }
}
