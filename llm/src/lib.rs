//! Caseguard LLM client
//!
//! Thin wrapper around a hosted OpenAI-style chat-completion API.
//! The HTTP layer sits behind a transport trait so tests run against
//! fixture responses instead of the network.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ChatClient, ChatConfig, Completion, ResponseFormat, REQUEST_TIMEOUT};
pub use error::LlmError;
pub use transport::{FakeTransport, HttpTransport, ReqwestTransport, TransportResponse};
