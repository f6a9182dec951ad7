//! HTTP transport for the LLM client
//!
//! Abstraction over the HTTP client so the chat client can be exercised
//! with fixture responses. `ReqwestTransport` is the real thing;
//! `FakeTransport` returns scripted results and records what was sent.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LlmError;

/// Raw upstream response: status plus body text
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Async POST-JSON transport
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<TransportResponse, LlmError>;
}

/// Real transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with a fixed request ceiling.
    ///
    /// Requests exceeding `timeout` are aborted and reported as
    /// `LlmError::Timeout`.
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<TransportResponse, LlmError> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.body(body.to_string()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// Scripted outcome for the fake transport
#[derive(Debug, Clone)]
enum FakeOutcome {
    Respond { status: u16, body: String },
    Timeout,
    Network(String),
}

/// Fake transport for tests: fixture responses, no network
#[derive(Debug)]
pub struct FakeTransport {
    outcome: FakeOutcome,
    /// Bodies of every request sent through this transport
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// Respond with the given status and body
    pub fn respond(status: u16, body: &str) -> Self {
        Self {
            outcome: FakeOutcome::Respond {
                status,
                body: body.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with a timeout
    pub fn timeout() -> Self {
        Self {
            outcome: FakeOutcome::Timeout,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with a network error
    pub fn network_error(message: &str) -> Self {
        Self {
            outcome: FakeOutcome::Network(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Request bodies sent so far
    pub fn recorded_requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn post_json(
        &self,
        _url: &str,
        _headers: &[(String, String)],
        body: &str,
    ) -> Result<TransportResponse, LlmError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(body.to_string());
        match &self.outcome {
            FakeOutcome::Respond { status, body } => Ok(TransportResponse {
                status: *status,
                body: body.clone(),
            }),
            FakeOutcome::Timeout => Err(LlmError::Timeout),
            FakeOutcome::Network(msg) => Err(LlmError::Network(msg.clone())),
        }
    }
}
