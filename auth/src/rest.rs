//! REST adapter for the hosted auth provider
//!
//! Talks to a GoTrue-style auth API (`/auth/v1/...`) and a
//! PostgREST-style data API (`/rest/v1/...`) under one base URL,
//! authenticated with the service key. 401/403 and 422 map to
//! `Rejected`; anything else non-2xx maps to `Backend`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::backend::{AuthBackend, AuthError, AuthSession, AuthUser, Company, Profile};

pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestBackend {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AuthError> {
        if base_url.trim().is_empty() || service_key.trim().is_empty() {
            return Err(AuthError::Configuration(
                "backend URL and service key are both required".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, bearer: &str, body: Value) -> Result<Value, AuthError> {
        let response = self
            .client
            .post(self.url(path))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .json(&body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value, AuthError> {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        if (200..300).contains(&status) {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| AuthError::Backend {
                status,
                message: format!("invalid JSON from backend: {}", e),
            });
        }
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("msg")
                    .or_else(|| v.get("message"))
                    .or_else(|| v.get("error_description"))
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
            })
            .unwrap_or(text);
        match status {
            400 | 401 | 403 | 422 => Err(AuthError::Rejected(message)),
            _ => Err(AuthError::Backend { status, message }),
        }
    }

    fn session_from(value: &Value) -> Result<AuthSession, AuthError> {
        let parse = || -> Option<AuthSession> {
            let user = value.get("user")?;
            Some(AuthSession {
                access_token: value.get("access_token")?.as_str()?.to_string(),
                refresh_token: value
                    .get("refresh_token")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                expires_at: value.get("expires_at").and_then(|v| v.as_i64()).unwrap_or(0),
                user: AuthUser {
                    id: user.get("id")?.as_str()?.to_string(),
                    email: user
                        .get("email")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    email_confirmed: user
                        .get("email_confirmed_at")
                        .map(|v| !v.is_null())
                        .unwrap_or(false),
                },
            })
        };
        parse().ok_or_else(|| AuthError::Backend {
            status: 200,
            message: "session payload missing expected fields".to_string(),
        })
    }
}

#[async_trait]
impl AuthBackend for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({"email": email, "password": password});
        let value = self
            .post("/auth/v1/token?grant_type=password", &self.service_key, body)
            .await?;
        Self::session_from(&value)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({"email": email, "password": password});
        let value = self.post("/auth/v1/signup", &self.service_key, body).await?;
        Self::session_from(&value)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.post("/auth/v1/logout", access_token, json!({})).await?;
        Ok(())
    }

    async fn verify_otp(&self, email: &str, token: &str) -> Result<AuthSession, AuthError> {
        let body = json!({"type": "email", "email": email, "token": token});
        let value = self.post("/auth/v1/verify", &self.service_key, body).await?;
        Self::session_from(&value)
    }

    async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let body = json!({"type": "signup", "email": email});
        self.post("/auth/v1/resend", &self.service_key, body).await?;
        Ok(())
    }

    async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let body = json!({"email": email, "redirect_to": redirect_to});
        self.post("/auth/v1/recover", &self.service_key, body).await?;
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .client
            .put(self.url("/auth/v1/user"))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&json!({"password": new_password}))
            .send()
            .await?;
        Self::decode(response).await?;
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AuthError> {
        let response = self
            .client
            .get(self.url(&format!("/rest/v1/profiles?user_id=eq.{}", user_id)))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await?;
        let value = Self::decode(response).await?;
        let rows = value.as_array().cloned().unwrap_or_default();
        match rows.first() {
            Some(row) => {
                let profile =
                    serde_json::from_value(row.clone()).map_err(|e| AuthError::Backend {
                        status: 200,
                        message: format!("invalid profile row: {}", e),
                    })?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AuthError> {
        let body = serde_json::to_value(profile).map_err(|e| AuthError::Configuration(e.to_string()))?;
        self.post("/rest/v1/profiles", &self.service_key, body).await?;
        Ok(())
    }

    async fn insert_company(&self, company: &Company) -> Result<(), AuthError> {
        let body = serde_json::to_value(company).map_err(|e| AuthError::Configuration(e.to_string()))?;
        self.post("/rest/v1/companies", &self.service_key, body).await?;
        Ok(())
    }
}
