//! Auth backend seam
//!
//! Everything the session service needs from the auth/database
//! provider, as one async trait. Profile and company rows live in the
//! application database next to the provider's user store; the service
//! reconciles them after authentication succeeds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Provider rejected the credentials or token
    #[error("credentials rejected: {0}")]
    Rejected(String),

    /// Connection-level failure reaching the provider
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with an unexpected status
    #[error("backend error {status}: {message}")]
    Backend { status: u16, message: String },

    /// Operation needs an authenticated session and none exists
    #[error("not signed in")]
    NotSignedIn,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

/// Authenticated identity as reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
}

/// Provider session tokens plus the user they belong to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp of token expiry
    pub expires_at: i64,
    pub user: AuthUser,
}

/// Application-level profile row keyed by the provider user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

/// Dependent company record, created alongside a fresh profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
}

/// Operations the session service requires from a provider
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Verify an emailed one-time code
    async fn verify_otp(&self, email: &str, token: &str) -> Result<AuthSession, AuthError>;

    async fn resend_verification(&self, email: &str) -> Result<(), AuthError>;

    /// Send a password-reset email with the given redirect target
    async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AuthError>;

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AuthError>;

    async fn insert_company(&self, company: &Company) -> Result<(), AuthError>;
}
