//! HTTP rendering of the request error taxonomy
//!
//! Every route returns `Result<_, ApiError>`; the wrapper converts a
//! [`CoachError`] into a JSON body of the shape
//! `{"error": {"kind", "message", "violations"?}}` with the status the
//! taxonomy assigns.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use caseguard_auth::AuthError;
use caseguard_core::{CoachError, Violation};
use caseguard_llm::LlmError;

pub struct ApiError(pub CoachError);

/// `axum::Json` with the rejection rendered through [`ApiError`].
///
/// A body that is not parseable JSON is a validation failure like any
/// other and must answer with the structured error shape, not axum's
/// plain-text default.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError(CoachError::InputValidation(vec![Violation::new(
                "$",
                rejection.body_text(),
            )]))),
        }
    }
}

impl From<CoachError> for ApiError {
    fn from(err: CoachError) -> Self {
        ApiError(err)
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        ApiError(CoachError::from(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let coach = match err {
            AuthError::Rejected(message) => {
                CoachError::InputValidation(vec![caseguard_core::Violation::new("$", message)])
            }
            AuthError::NotSignedIn => CoachError::UpstreamAuth("not signed in".to_string()),
            AuthError::Network(message) => CoachError::UpstreamNetwork(message),
            AuthError::Backend { status, message } => CoachError::UpstreamHttp { status, message },
            AuthError::Configuration(message) => CoachError::Internal(message),
        };
        ApiError(coach)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(kind = err.kind(), error = %err, "request failed");
        } else {
            warn!(kind = err.kind(), error = %err, "request rejected");
        }

        let mut body = json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        if let Some(violations) = err.violations() {
            body["error"]["violations"] = json!(violations
                .iter()
                .map(|v| json!({"path": v.path, "reason": v.reason}))
                .collect::<Vec<_>>());
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_timeout_maps_to_coach_taxonomy() {
        let err = ApiError::from(LlmError::Timeout);
        assert_eq!(err.0.kind(), "upstream_timeout");
        assert_eq!(err.0.status_code(), 502);
    }

    #[test]
    fn test_auth_rejection_is_a_client_error() {
        let err = ApiError::from(AuthError::Rejected("bad token".to_string()));
        assert_eq!(err.0.status_code(), 400);
    }

    #[test]
    fn test_missing_session_is_unauthorized() {
        let err = ApiError::from(AuthError::NotSignedIn);
        assert_eq!(err.0.status_code(), 401);
    }
}
