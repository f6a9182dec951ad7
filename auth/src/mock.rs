//! In-memory auth backend for local development and tests
//!
//! Accepts any credentials, synthesizes sessions, and stores profiles
//! and companies in process memory. User ids are derived from the email
//! so repeated sign-ins resolve to the same account.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use uuid::Uuid;

use crate::backend::{AuthBackend, AuthError, AuthSession, AuthUser, Company, Profile};

#[derive(Default)]
struct MockStore {
    profiles: HashMap<String, Profile>,
    companies: HashMap<String, Company>,
}

pub struct MockBackend {
    store: Mutex<MockStore>,
    fail_profile_writes: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(MockStore::default()),
            fail_profile_writes: false,
        }
    }

    /// Variant whose profile and company inserts always fail. Used to
    /// exercise the best-effort reconciliation path in the service.
    pub fn with_profile_failure() -> Self {
        Self {
            store: Mutex::new(MockStore::default()),
            fail_profile_writes: true,
        }
    }

    fn user_id_for(email: &str) -> String {
        let mut hasher = DefaultHasher::new();
        email.to_lowercase().hash(&mut hasher);
        let seed = hasher.finish();
        Uuid::from_u64_pair(seed, seed.rotate_left(17)).to_string()
    }

    fn session_for(email: &str) -> AuthSession {
        let now = Utc::now().timestamp();
        AuthSession {
            access_token: format!("mock-access-{}", Uuid::new_v4()),
            refresh_token: format!("mock-refresh-{}", Uuid::new_v4()),
            expires_at: now + 3600,
            user: AuthUser {
                id: Self::user_id_for(email),
                email: email.to_string(),
                email_confirmed: true,
            },
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Rejected("email is required".to_string()));
        }
        Ok(Self::session_for(email))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Rejected("email is required".to_string()));
        }
        Ok(Self::session_for(email))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn verify_otp(&self, email: &str, token: &str) -> Result<AuthSession, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Rejected("verification code is required".to_string()));
        }
        Ok(Self::session_for(email))
    }

    async fn resend_verification(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn reset_password(&self, _email: &str, _redirect_to: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn update_password(
        &self,
        _access_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::Rejected(
                "password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, AuthError> {
        let store = self.store.lock().unwrap();
        Ok(store.profiles.get(user_id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AuthError> {
        if self.fail_profile_writes {
            return Err(AuthError::Backend {
                status: 503,
                message: "profile storage unavailable".to_string(),
            });
        }
        let mut store = self.store.lock().unwrap();
        store.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn insert_company(&self, company: &Company) -> Result<(), AuthError> {
        if self.fail_profile_writes {
            return Err(AuthError::Backend {
                status: 503,
                message: "company storage unavailable".to_string(),
            });
        }
        let mut store = self.store.lock().unwrap();
        store.companies.insert(company.id.clone(), company.clone());
        Ok(())
    }
}
