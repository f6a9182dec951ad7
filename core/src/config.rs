//! Environment configuration
//!
//! Every external collaborator (LLM API, auth backend, vector store,
//! e-signature) is optional; the service falls back to demo/mock
//! behavior for whatever is absent. Placeholder sentinel values are
//! configuration, not hard-coded constants, so a partially configured
//! deployment does not silently stay in demo mode.

use std::env;

/// Placeholder values that count as "no credential configured".
///
/// Overridable via `PLACEHOLDER_API_KEYS` (comma-separated).
const DEFAULT_PLACEHOLDER_KEYS: [&str; 4] = [
    "your-openai-api-key",
    "your_openai_api_key_here",
    "sk-placeholder",
    "changeme",
];

/// Process-wide configuration, read once at startup and passed down
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment label (`APP_ENV`)
    pub environment: String,
    /// LLM credential; absent or sentinel means demo mode
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Auth/database backend pair; absent means mock auth
    pub backend_url: Option<String>,
    pub backend_service_key: Option<String>,
    pub vector_store_key: Option<String>,
    pub esign_api_key: Option<String>,
    /// Base URL used for auth redirect links
    pub site_base_url: String,
    placeholder_keys: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
            backend_url: None,
            backend_service_key: None,
            vector_store_key: None,
            esign_api_key: None,
            site_base_url: "http://localhost:3000".to_string(),
            placeholder_keys: DEFAULT_PLACEHOLDER_KEYS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("HOST", &defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            environment: env_or("APP_ENV", &defaults.environment),
            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            openai_base_url: env_or("OPENAI_BASE_URL", &defaults.openai_base_url),
            openai_model: env_or("OPENAI_MODEL", &defaults.openai_model),
            backend_url: non_empty(env::var("BACKEND_URL").ok()),
            backend_service_key: non_empty(env::var("BACKEND_SERVICE_KEY").ok()),
            vector_store_key: non_empty(env::var("VECTOR_STORE_KEY").ok()),
            esign_api_key: non_empty(env::var("ESIGN_API_KEY").ok()),
            site_base_url: env_or("SITE_BASE_URL", &defaults.site_base_url),
            placeholder_keys: env::var("PLACEHOLDER_API_KEYS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.placeholder_keys),
        }
    }

    /// Replace the sentinel list
    pub fn with_placeholder_keys(mut self, keys: Vec<String>) -> Self {
        self.placeholder_keys = keys;
        self
    }

    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// True when the value is present, non-empty, and not a sentinel
    pub fn is_usable_key(&self, key: &str) -> bool {
        let key = key.trim();
        !key.is_empty() && !self.placeholder_keys.iter().any(|p| p == key)
    }

    /// Resolve the LLM credential for one request.
    ///
    /// An explicit header-supplied key wins over the environment key;
    /// the environment key is additionally screened against the
    /// sentinel list. Returns `None` when the request must take the
    /// demo path. The header override is never persisted.
    pub fn resolved_api_key(&self, header_key: Option<&str>) -> Option<String> {
        if let Some(key) = header_key {
            let key = key.trim();
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
        self.openai_api_key
            .as_deref()
            .filter(|key| self.is_usable_key(key))
            .map(|key| key.to_string())
    }

    /// True when no usable environment credential exists
    pub fn is_demo_mode(&self) -> bool {
        self.resolved_api_key(None).is_none()
    }

    /// True when a real auth backend is configured
    pub fn has_auth_backend(&self) -> bool {
        matches!(
            (&self.backend_url, &self.backend_service_key),
            (Some(url), Some(key)) if self.is_usable_key(url) && self.is_usable_key(key)
        )
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
