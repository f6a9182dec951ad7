//! Session state service
//!
//! Wraps an [`AuthBackend`] with observable state. Consumers subscribe
//! through a `watch` channel and see every transition: loading flips on
//! while a backend call is in flight, errors land in `error`, and a
//! failed profile write lands in `profile_warning` without failing the
//! sign-in itself.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{AuthBackend, AuthError, AuthSession, AuthUser, Company, Profile};

/// Snapshot of the current authentication state.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set when sign-in succeeded but profile reconciliation did not.
    pub profile_warning: Option<String>,
    pub is_mock_mode: bool,
}

/// What a sign-in or sign-up attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn,
    /// Account exists but the email has not been confirmed yet.
    ConfirmationRequired,
}

pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    tx: watch::Sender<AuthState>,
    rx: watch::Receiver<AuthState>,
    is_mock_mode: bool,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, is_mock_mode: bool) -> Self {
        let (tx, rx) = watch::channel(AuthState {
            is_mock_mode,
            ..AuthState::default()
        });
        Self {
            backend,
            tx,
            rx,
            is_mock_mode,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.rx.clone()
    }

    pub fn state(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    pub fn is_mock_mode(&self) -> bool {
        self.is_mock_mode
    }

    fn update<F: FnOnce(&mut AuthState)>(&self, f: F) {
        self.tx.send_modify(f);
    }

    fn begin(&self) {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn fail(&self, err: &AuthError) {
        self.update(|s| {
            s.loading = false;
            s.error = Some(err.to_string());
        });
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, AuthError> {
        self.begin();
        match self.backend.sign_in(email, password).await {
            Ok(session) => Ok(self.adopt_session(email, session).await),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignInOutcome, AuthError> {
        self.begin();
        match self.backend.sign_up(email, password).await {
            Ok(session) => Ok(self.adopt_session(email, session).await),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.state().session.map(|s| s.access_token);
        if let Some(token) = token {
            if let Err(err) = self.backend.sign_out(&token).await {
                warn!(error = %err, "sign-out call failed, clearing local session anyway");
            }
        }
        self.update(|s| {
            s.user = None;
            s.session = None;
            s.loading = false;
            s.error = None;
            s.profile_warning = None;
        });
        Ok(())
    }

    pub async fn verify_otp(&self, email: &str, token: &str) -> Result<SignInOutcome, AuthError> {
        self.begin();
        match self.backend.verify_otp(email, token).await {
            Ok(session) => Ok(self.adopt_session(email, session).await),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        self.backend.resend_verification(email).await
    }

    pub async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.backend.reset_password(email, redirect_to).await
    }

    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let token = self
            .state()
            .session
            .map(|s| s.access_token)
            .ok_or(AuthError::NotSignedIn)?;
        self.backend.update_password(&token, new_password).await
    }

    /// Retry profile reconciliation for the signed-in user. Clears the
    /// warning on success.
    pub async fn retry_profile_creation(&self) -> Result<(), AuthError> {
        let user = self.state().user.ok_or(AuthError::NotSignedIn)?;
        match self.ensure_profile(&user).await {
            Ok(()) => {
                self.update(|s| s.profile_warning = None);
                Ok(())
            }
            Err(err) => {
                self.update(|s| s.profile_warning = Some(err.to_string()));
                Err(err)
            }
        }
    }

    async fn adopt_session(&self, email: &str, session: AuthSession) -> SignInOutcome {
        if !session.user.email_confirmed && !self.is_mock_mode {
            self.update(|s| s.loading = false);
            return SignInOutcome::ConfirmationRequired;
        }
        let user = session.user.clone();
        let warning = match self.ensure_profile(&user).await {
            Ok(()) => None,
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "profile reconciliation failed");
                Some(err.to_string())
            }
        };
        info!(user_id = %user.id, email = %email, "signed in");
        self.update(|s| {
            s.user = Some(user);
            s.session = Some(session);
            s.loading = false;
            s.error = None;
            s.profile_warning = warning;
        });
        SignInOutcome::SignedIn
    }

    /// Create the user's profile row (and a company derived from the
    /// email domain) if one does not exist yet.
    async fn ensure_profile(&self, user: &AuthUser) -> Result<(), AuthError> {
        if self.backend.fetch_profile(&user.id).await?.is_some() {
            return Ok(());
        }
        let company_id = match company_name_from_email(&user.email) {
            Some(name) => {
                let company = Company {
                    id: Uuid::new_v4().to_string(),
                    name,
                };
                self.backend.insert_company(&company).await?;
                Some(company.id)
            }
            None => None,
        };
        let profile = Profile {
            user_id: user.id.clone(),
            email: user.email.clone(),
            full_name: None,
            company_id,
        };
        self.backend.insert_profile(&profile).await
    }
}

fn company_name_from_email(email: &str) -> Option<String> {
    let domain = email.split('@').nth(1)?.trim();
    let label = domain.split('.').next()?.trim();
    if label.is_empty() {
        return None;
    }
    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn service(backend: MockBackend) -> AuthService {
        AuthService::new(Arc::new(backend), true)
    }

    #[tokio::test]
    async fn test_sign_in_updates_state() {
        let svc = service(MockBackend::new());
        let outcome = svc.sign_in("dev@acme.com", "pw").await.unwrap();
        assert_eq!(outcome, SignInOutcome::SignedIn);
        let state = svc.state();
        assert!(state.user.is_some());
        assert!(state.session.is_some());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.profile_warning.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() {
        let svc = service(MockBackend::new());
        svc.sign_in("dev@acme.com", "pw").await.unwrap();
        svc.sign_out().await.unwrap();
        let state = svc.state();
        assert!(state.user.is_none());
        assert!(state.session.is_none());
    }

    #[tokio::test]
    async fn test_profile_failure_warns_but_signs_in() {
        let svc = service(MockBackend::with_profile_failure());
        let outcome = svc.sign_in("dev@acme.com", "pw").await.unwrap();
        assert_eq!(outcome, SignInOutcome::SignedIn);
        let state = svc.state();
        assert!(state.user.is_some());
        assert!(state.profile_warning.is_some());
    }

    #[tokio::test]
    async fn test_profile_created_once() {
        let backend = Arc::new(MockBackend::new());
        let svc = AuthService::new(backend.clone(), true);
        svc.sign_in("dev@acme.com", "pw").await.unwrap();
        let user_id = svc.state().user.unwrap().id;
        let profile = backend.fetch_profile(&user_id).await.unwrap().unwrap();
        assert_eq!(profile.email, "dev@acme.com");
        assert!(profile.company_id.is_some());
        // second sign-in reuses the existing profile
        svc.sign_in("dev@acme.com", "pw").await.unwrap();
        assert!(svc.state().profile_warning.is_none());
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let svc = service(MockBackend::new());
        assert!(matches!(
            svc.update_password("new-password").await,
            Err(AuthError::NotSignedIn)
        ));
        svc.sign_in("dev@acme.com", "pw").await.unwrap();
        svc.update_password("new-password").await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let svc = service(MockBackend::new());
        let rx = svc.subscribe();
        svc.sign_in("dev@acme.com", "pw").await.unwrap();
        assert!(rx.borrow().user.is_some());
    }

    #[test]
    fn test_company_name_from_email() {
        assert_eq!(company_name_from_email("a@acme.com"), Some("Acme".to_string()));
        assert_eq!(company_name_from_email("nodomain"), None);
    }
}
