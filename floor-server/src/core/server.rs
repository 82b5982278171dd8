//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::time::Duration;

use crate::api;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let tasks = state.start_background_tasks();
        let token = tasks.shutdown_token();

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            node_id = %self.config.node_id,
            environment = %self.config.environment,
            "Floor server listening on {}",
            addr
        );

        let app = api::build_app(state.clone());
        let shutdown = async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down...");
                }
                _ = token.cancelled() => {}
            }
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        let exited = tasks.finished();
        if !exited.is_empty() {
            tracing::warn!(tasks = ?exited, "Background tasks exited before shutdown");
        }

        let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        if tokio::time::timeout(timeout, tasks.shutdown()).await.is_err() {
            tracing::warn!(
                timeout_ms = self.config.shutdown_timeout_ms,
                "Background tasks did not stop in time"
            );
        }
        Ok(())
    }
}
