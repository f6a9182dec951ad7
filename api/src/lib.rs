//! Caseguard HTTP API
//!
//! Routes, orchestration, and error rendering for the incident-coach
//! backend. Handlers validate inbound bodies, pick the live or demo
//! path per request, and re-validate everything before it ships.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::ApiError;
pub use handlers::{ApiState, API_KEY_HEADER};
pub use models::{ConfigResponse, HealthResponse, TestKeyResponse};
pub use server::{router, ApiServer};
