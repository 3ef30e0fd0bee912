//! HTTP server for the question form

pub mod routes;
pub mod state;

use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::pipeline::QaPipeline;
use state::AppState;

/// Web form server
pub struct QaServer {
    config: ServerConfig,
    state: AppState,
}

impl QaServer {
    /// Create a server around a ready pipeline
    pub fn new(config: ServerConfig, pipeline: QaPipeline) -> Self {
        let state = AppState::new(pipeline, config.max_upload_size);
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        routes::form_routes(self.config.max_upload_size)
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting PDF QA server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        self.config.address()
    }
}
