//! Request handlers
//!
//! Each coach route follows the same shape: validate the body against
//! its input schema, resolve a credential, then take either the live
//! model path or the deterministic demo path. Model output is parsed
//! and re-validated before it leaves the process; demo output failing
//! its own schema is a defect and surfaces as a 500.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use caseguard_auth::AuthService;
use caseguard_coach::{
    build_questions_prompt, build_report_prompt, demo_questions, demo_report,
    final_report_request_schema, incident_report_schema, next_questions_request_schema,
    questions_response_schema, QUESTIONS_SYSTEM_PROMPT, REPORT_SYSTEM_PROMPT,
};
use caseguard_core::{
    calculate_cost, AppConfig, CoachError, IncidentBasics, QaExchange, Schema, TokenUsage,
};
use caseguard_llm::{ChatClient, ChatConfig, Completion, HttpTransport, ResponseFormat};

use crate::error::{ApiError, ApiJson};
use crate::models::{
    ConfigResponse, HealthResponse, OkResponse, ResetPasswordRequest, TestKeyResponse,
    UpdatePasswordRequest,
};

/// Credential override header checked on every coach route
pub const API_KEY_HEADER: &str = "x-openai-api-key";

const QUESTIONS_TEMPERATURE: f32 = 0.4;
const REPORT_TEMPERATURE: f32 = 0.2;

/// Shared state handed to every handler
pub struct ApiState {
    pub config: AppConfig,
    pub transport: Arc<dyn HttpTransport>,
    pub auth: Arc<AuthService>,
}

// Optional sequences are `Option` so an explicit `null` decodes like
// an absent field instead of failing after validation passed.
#[derive(Debug, Deserialize)]
struct NextQuestionsRequest {
    basics: IncidentBasics,
    #[serde(default)]
    history: Option<Vec<QaExchange>>,
}

#[derive(Debug, Deserialize)]
struct FinalReportRequest {
    basics: IncidentBasics,
    #[serde(default)]
    qa: Option<Vec<QaExchange>>,
}

/// Validate a raw body against `schema`, then deserialize it. A typed
/// decode failure after validation passed is a schema/type mismatch on
/// our side, not a user error.
fn decode_request<T: serde::de::DeserializeOwned>(
    schema: &Schema,
    body: Value,
) -> Result<T, CoachError> {
    schema
        .validate(&body)
        .map_err(CoachError::InputValidation)?;
    serde_json::from_value(body)
        .map_err(|e| CoachError::Internal(format!("validated body failed to decode: {}", e)))
}

fn header_api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

fn chat_client(state: &ApiState, api_key: String) -> Result<ChatClient, ApiError> {
    let config = ChatConfig::new(
        api_key,
        state.config.openai_base_url.clone(),
        state.config.openai_model.clone(),
    );
    Ok(ChatClient::with_transport(config, state.transport.clone())?)
}

/// Parse model output as JSON and check it against the output schema.
fn check_model_output(schema: &Schema, completion: &Completion) -> Result<Value, CoachError> {
    let value: Value = serde_json::from_str(&completion.content)
        .map_err(|e| CoachError::MalformedModelOutput(e.to_string()))?;
    schema
        .validate(&value)
        .map_err(CoachError::OutputValidation)?;
    Ok(value)
}

/// Validate demo output against the same schema the model path uses.
/// A failure here means the generator drifted from the schema.
fn check_demo_output(schema: &Schema, value: Value) -> Result<Value, CoachError> {
    schema.validate(&value).map_err(|violations| {
        CoachError::Internal(format!(
            "demo output failed its own schema ({} violation(s))",
            violations.len()
        ))
    })?;
    Ok(value)
}

/// Attach token usage and cost to a successful live response.
fn attach_usage(value: &mut Value, usage: &TokenUsage) {
    let cost = calculate_cost(usage);
    value["_usage"] = json!({
        "prompt_tokens": usage.prompt_tokens,
        "completion_tokens": usage.completion_tokens,
        "cached_tokens": usage.cached_tokens.unwrap_or(0),
        "cost": cost.format(),
    });
}

/// POST /api/coach/next-questions
pub async fn next_questions(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, ApiError> {
    let request: NextQuestionsRequest =
        decode_request(&next_questions_request_schema(), body)?;
    let history = request.history.unwrap_or_default();
    let output_schema = questions_response_schema();

    match state.config.resolved_api_key(header_api_key(&headers)) {
        Some(key) => {
            let client = chat_client(&state, key)?;
            let prompt = build_questions_prompt(&request.basics, &history);
            let completion = client
                .complete(
                    QUESTIONS_SYSTEM_PROMPT,
                    &prompt,
                    ResponseFormat::JsonObject,
                    QUESTIONS_TEMPERATURE,
                )
                .await?;
            let mut value = check_model_output(&output_schema, &completion)?;
            if let Some(usage) = &completion.usage {
                attach_usage(&mut value, usage);
            }
            Ok(Json(value))
        }
        None => {
            debug!("no usable credential, serving demo questions");
            let value = demo_questions(&request.basics, &history);
            Ok(Json(check_demo_output(&output_schema, value)?))
        }
    }
}

/// POST /api/coach/final-report
pub async fn final_report(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Value>, ApiError> {
    let request: FinalReportRequest = decode_request(&final_report_request_schema(), body)?;
    let qa = request.qa.unwrap_or_default();
    let output_schema = incident_report_schema();

    match state.config.resolved_api_key(header_api_key(&headers)) {
        Some(key) => {
            let client = chat_client(&state, key)?;
            let prompt = build_report_prompt(&request.basics, &qa);
            let completion = client
                .complete(
                    REPORT_SYSTEM_PROMPT,
                    &prompt,
                    ResponseFormat::JsonObject,
                    REPORT_TEMPERATURE,
                )
                .await?;
            let mut value = check_model_output(&output_schema, &completion)?;
            if let Some(usage) = &completion.usage {
                attach_usage(&mut value, usage);
            }
            Ok(Json(value))
        }
        None => {
            debug!("no usable credential, serving demo report");
            let value = demo_report(&request.basics, &qa);
            Ok(Json(check_demo_output(&output_schema, value)?))
        }
    }
}

/// GET /api/config
pub async fn get_config(State(state): State<Arc<ApiState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        is_demo_mode: state.config.is_demo_mode(),
        has_openai_key: !state.config.is_demo_mode(),
        environment: state.config.environment.clone(),
    })
}

/// POST /api/test-api-key
///
/// Round-trips a trivial text completion with the header-supplied key.
/// Demo mode never applies here: no header key means a 400.
pub async fn test_api_key(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<TestKeyResponse>, ApiError> {
    let key = header_api_key(&headers)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            CoachError::InputValidation(vec![caseguard_core::Violation::new(
                API_KEY_HEADER,
                "header is required",
            )])
        })?;

    let client = chat_client(&state, key.to_string())?;
    let completion = client
        .complete(
            "You are a connectivity probe.",
            "Reply with the single word OK.",
            ResponseFormat::Text,
            0.0,
        )
        .await?;
    info!(model = client.model(), "API key check succeeded");
    Ok(Json(TestKeyResponse {
        success: true,
        model: client.model().to_string(),
        reply: completion.content.trim().to_string(),
    }))
}

/// GET /api/health
pub async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "caseguard-api".to_string(),
        demo_mode: state.config.is_demo_mode(),
        auth_backend: if state.auth.is_mock_mode() {
            "mock".to_string()
        } else {
            "rest".to_string()
        },
    })
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<ApiState>>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    if request.email.trim().is_empty() {
        return Err(CoachError::InputValidation(vec![
            caseguard_core::Violation::new("email", "must not be empty"),
        ])
        .into());
    }
    let redirect_to = format!("{}/reset-password", state.config.site_base_url);
    state.auth.reset_password(&request.email, &redirect_to).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// POST /api/auth/update-password
pub async fn update_password(
    State(state): State<Arc<ApiState>>,
    ApiJson(request): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    state.auth.update_password(&request.new_password).await?;
    Ok(Json(OkResponse { ok: true }))
}
