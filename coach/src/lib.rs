//! Caseguard coaching pipeline
//!
//! Prompt templates, output schemas, and the demo generator behind the
//! incident-coach endpoints. Everything here is pure: the same inputs
//! always produce the same prompts and the same demo responses.

pub mod demo;
pub mod prompts;
pub mod schemas;

pub use demo::{demo_questions, demo_report};
pub use prompts::{
    build_questions_prompt, build_report_prompt, QUESTIONS_SYSTEM_PROMPT, REPORT_SYSTEM_PROMPT,
};
pub use schemas::{
    final_report_request_schema, incident_report_schema, next_questions_request_schema,
    questions_response_schema,
};
