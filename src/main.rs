//! Caseguard service binary
//!
//! Reads configuration from the environment, picks the real or mock
//! auth backend, and serves the HTTP API.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use caseguard_api::{ApiServer, ApiState};
use caseguard_auth::{AuthBackend, AuthService, MockBackend, RestBackend};
use caseguard_core::AppConfig;
use caseguard_llm::{ReqwestTransport, REQUEST_TIMEOUT};

#[derive(Parser, Debug)]
#[command(name = "caseguard", about = "Employment-compliance incident coach API")]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.is_demo_mode() {
        warn!("no usable OPENAI_API_KEY configured, coach routes serve demo output");
    } else {
        info!(model = %config.openai_model, "live model path enabled");
    }

    let (backend, is_mock): (Arc<dyn AuthBackend>, bool) = if config.has_auth_backend() {
        let url = config.backend_url.clone().unwrap_or_default();
        let key = config.backend_service_key.clone().unwrap_or_default();
        info!(backend_url = %url, "using REST auth backend");
        (Arc::new(RestBackend::new(&url, &key)?), false)
    } else {
        warn!("no auth backend configured, using in-memory mock auth");
        (Arc::new(MockBackend::new()), true)
    };
    let auth = Arc::new(AuthService::new(backend, is_mock));

    let transport = Arc::new(ReqwestTransport::new(REQUEST_TIMEOUT)?);
    let host = config.host.clone();
    let port = config.port;
    let state = Arc::new(ApiState {
        config,
        transport,
        auth,
    });

    ApiServer::new(state).start(&host, port).await
}
