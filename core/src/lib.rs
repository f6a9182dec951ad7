//! Caseguard core: shared types for the incident-coach backend
//!
//! This crate holds everything the other crates agree on: the incident
//! data model, the declarative JSON schema validator, environment
//! configuration, the request error taxonomy, and token cost accounting.

pub mod config;
pub mod cost;
pub mod error;
pub mod incident;
pub mod schema;

// Re-export the types the rest of the workspace reaches for constantly
pub use config::AppConfig;
pub use cost::{calculate_cost, CostBreakdown, TokenUsage};
pub use error::CoachError;
pub use incident::{
    Attachment, IncidentBasics, IncidentReport, PolicyViolation, QaExchange, RiskLevel, Severity,
};
pub use schema::{FieldSchema, Schema, Violation};
