//! Chat-completion client
//!
//! Single-attempt wrapper around the hosted chat-completion endpoint.
//! Construction fails fast on an empty credential; the only bounded
//! wait is the transport's request ceiling. The client returns the raw
//! response text — callers parse it as JSON when they asked for a
//! structured response.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use caseguard_core::TokenUsage;

use crate::error::LlmError;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Fixed ceiling on one upstream call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the model is asked to shape its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Force a single JSON object (production calls)
    JsonObject,
    /// Free text (credential self-test); exempt from schema validation
    Text,
}

/// Connection settings for one client
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ChatConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

/// Successful completion: raw text plus usage when the provider sent it
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

pub struct ChatClient {
    config: ChatConfig,
    transport: Arc<dyn HttpTransport>,
}

// Manual impl: the transport trait object has no Debug bound, and the
// config holds a credential that must not land in logs.
impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Build a client with the real HTTP transport.
    ///
    /// Fails immediately when the credential is empty; no network call
    /// is ever attempted with a blank key.
    pub fn new(config: ChatConfig) -> Result<Self, LlmError> {
        let transport = Arc::new(ReqwestTransport::new(REQUEST_TIMEOUT)?);
        Self::with_transport(config, transport)
    }

    /// Build a client over an injected transport (tests, shared clients)
    pub fn with_transport(
        config: ChatConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "API key must not be empty".to_string(),
            ));
        }
        Ok(Self { config, transport })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run one chat completion. Single attempt, no retries.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: ResponseFormat,
        temperature: f32,
    ) -> Result<Completion, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = self.build_request(system_prompt, user_prompt, format, temperature);
        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.api_key),
        )];

        tracing::debug!(model = %self.config.model, "sending chat completion request");
        let response = self.transport.post_json(&url, &headers, &body).await?;

        if response.status == 401 || response.status == 403 {
            return Err(LlmError::Auth(truncate(&response.body, 512)));
        }
        if !(200..300).contains(&response.status) {
            return Err(LlmError::Http {
                status: response.status,
                message: truncate(&response.body, 512),
            });
        }

        Self::extract_completion(&response.body)
    }

    fn build_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        format: ResponseFormat,
        temperature: f32,
    ) -> String {
        let mut request = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": temperature,
        });
        if format == ResponseFormat::JsonObject {
            request["response_format"] = serde_json::json!({"type": "json_object"});
        }
        request.to_string()
    }

    /// Pull content and usage out of a chat-completion response body.
    ///
    /// The content itself is returned as-is; this never parses the
    /// model's text, only the envelope around it.
    fn extract_completion(body: &str) -> Result<Completion, LlmError> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| LlmError::InvalidResponse(format!("response is not JSON: {}", e)))?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing choices[0].message.content".to_string())
            })?
            .to_string();

        let usage = json.get("usage").and_then(|u| {
            Some(TokenUsage {
                prompt_tokens: u.get("prompt_tokens")?.as_u64()?,
                completion_tokens: u.get("completion_tokens")?.as_u64()?,
                cached_tokens: u
                    .get("prompt_tokens_details")
                    .and_then(|d| d.get("cached_tokens"))
                    .and_then(|c| c.as_u64()),
            })
        });

        Ok(Completion { content, usage })
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeTransport;

    fn config(key: &str) -> ChatConfig {
        ChatConfig::new(key, "https://api.openai.com/v1", "gpt-4o")
    }

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {
                "prompt_tokens": 120,
                "completion_tokens": 48,
                "prompt_tokens_details": {"cached_tokens": 20}
            }
        })
        .to_string()
    }

    #[test]
    fn test_debug_output_omits_credential() {
        let transport = Arc::new(FakeTransport::respond(200, "{}"));
        let client = ChatClient::with_transport(config("sk-secret-key"), transport).unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("gpt-4o"));
        assert!(!rendered.contains("sk-secret-key"));
    }

    #[test]
    fn test_empty_key_fails_construction_without_network() {
        let err = ChatClient::new(config("")).unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));

        let transport = Arc::new(FakeTransport::respond(200, "{}"));
        let err = ChatClient::with_transport(config("   "), transport.clone()).unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
        assert!(transport.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_complete_returns_content_and_usage() {
        let transport = Arc::new(FakeTransport::respond(200, &completion_body("{\"ok\":1}")));
        let client = ChatClient::with_transport(config("sk-test"), transport).unwrap();
        let completion = client
            .complete("system", "user", ResponseFormat::JsonObject, 0.2)
            .await
            .unwrap();
        assert_eq!(completion.content, "{\"ok\":1}");
        let usage = completion.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.cached_tokens, Some(20));
    }

    #[tokio::test]
    async fn test_json_format_requested_in_body() {
        let transport = Arc::new(FakeTransport::respond(200, &completion_body("x")));
        let client = ChatClient::with_transport(config("sk-test"), transport.clone()).unwrap();
        client
            .complete("s", "u", ResponseFormat::JsonObject, 0.0)
            .await
            .unwrap();
        let sent = transport.recorded_requests();
        assert!(sent[0].contains("json_object"));

        client
            .complete("s", "u", ResponseFormat::Text, 0.0)
            .await
            .unwrap();
        let sent = transport.recorded_requests();
        assert!(!sent[1].contains("json_object"));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_timeout_kind() {
        let transport = Arc::new(FakeTransport::timeout());
        let client = ChatClient::with_transport(config("sk-test"), transport).unwrap();
        let err = client
            .complete("s", "u", ResponseFormat::JsonObject, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces_as_network_kind() {
        let transport = Arc::new(FakeTransport::network_error("connection refused"));
        let client = ChatClient::with_transport(config("sk-test"), transport).unwrap();
        let err = client
            .complete("s", "u", ResponseFormat::JsonObject, 0.0)
            .await
            .unwrap_err();
        match err {
            LlmError::Network(message) => assert!(message.contains("refused")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let transport = Arc::new(FakeTransport::respond(
            401,
            r#"{"error":{"message":"Incorrect API key"}}"#,
        ));
        let client = ChatClient::with_transport(config("sk-bad"), transport).unwrap();
        let err = client
            .complete("s", "u", ResponseFormat::Text, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Auth(_)));
    }

    #[tokio::test]
    async fn test_server_error_carries_status() {
        let transport = Arc::new(FakeTransport::respond(503, "overloaded"));
        let client = ChatClient::with_transport(config("sk-test"), transport).unwrap();
        let err = client
            .complete("s", "u", ResponseFormat::JsonObject, 0.0)
            .await
            .unwrap_err();
        match err {
            LlmError::Http { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_invalid_response() {
        let transport = Arc::new(FakeTransport::respond(200, r#"{"choices": []}"#));
        let client = ChatClient::with_transport(config("sk-test"), transport).unwrap();
        let err = client
            .complete("s", "u", ResponseFormat::JsonObject, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_usage_absent_is_none() {
        let body = r#"{"choices": [{"message": {"content": "hi"}}]}"#;
        let transport = Arc::new(FakeTransport::respond(200, body));
        let client = ChatClient::with_transport(config("sk-test"), transport).unwrap();
        let completion = client
            .complete("s", "u", ResponseFormat::Text, 0.0)
            .await
            .unwrap();
        assert!(completion.usage.is_none());
    }
}
