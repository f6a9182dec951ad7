//! Caseguard auth
//!
//! Session management over a pluggable auth backend. The backend seam
//! has two implementations chosen by configuration at process start: a
//! REST adapter for the hosted provider, and an in-memory mock that
//! resolves immediately and never touches a network.

pub mod backend;
pub mod mock;
pub mod rest;
pub mod service;

pub use backend::{AuthBackend, AuthError, AuthSession, AuthUser, Company, Profile};
pub use mock::MockBackend;
pub use rest::RestBackend;
pub use service::{AuthService, AuthState, SignInOutcome};
