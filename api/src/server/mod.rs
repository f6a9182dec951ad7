//! Server setup
//!
//! Router construction is split from binding so tests can drive the
//! router directly with `tower::ServiceExt::oneshot`.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers::{
    final_report, get_config, health_check, next_questions, reset_password, test_api_key,
    update_password, ApiState,
};

/// Build the full application router over shared state.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/coach/next-questions", post(next_questions))
        .route("/api/coach/final-report", post(final_report))
        .route("/api/config", get(get_config))
        .route("/api/test-api-key", post(test_api_key))
        .route("/api/health", get(health_check))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/update-password", post(update_password))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct ApiServer {
    state: Arc<ApiState>,
}

impl ApiServer {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(&self, host: &str, port: u16) -> Result<()> {
        let app = router(self.state.clone());
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        info!(%addr, "caseguard API listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("server error: {}", e))?;
        Ok(())
    }
}
