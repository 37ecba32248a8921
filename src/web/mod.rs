//! Web server module for the control UI.
//!
//! Provides an HTTP server using Axum. Handlers never touch the animator
//! directly: they queue [`EyeCommand`]s for the frame loop and read the
//! snapshot it publishes.

pub mod routes;
pub mod templates;

use crate::config::Config;
use crate::eyes::{EyeCommand, EyeSnapshot};
use axum::{
    routing::{get, post},
    Router,
};
use routes::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch, RwLock};

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),

    #[error("Server error: {0}")]
    ServerError(String),
}

/// Web server configuration
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    /// Create a new web server
    pub fn new(
        config: Arc<RwLock<Config>>,
        commands: mpsc::Sender<EyeCommand>,
        snapshots: watch::Receiver<EyeSnapshot>,
        config_path: String,
    ) -> Self {
        Self {
            state: AppState {
                config,
                commands,
                snapshots,
                config_path,
            },
        }
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        Router::new()
            .route("/", get(routes::index))
            .route("/state", get(routes::state))
            .route("/mood", post(routes::set_mood))
            .route("/position", post(routes::set_position))
            .route("/mode", post(routes::set_mode))
            .route("/autoblink", post(routes::set_autoblink))
            .route("/idle", post(routes::set_idle))
            .route("/flicker", post(routes::set_flicker))
            .route("/save", post(routes::save_eyes))
            .route("/action/{action}", get(routes::eye_action))
            .route("/health", get(routes::health))
            .with_state(self.state.clone())
    }

    /// Run the web server with graceful shutdown
    pub async fn run_with_shutdown(
        &self,
        port: u16,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), WebError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Web server listening on http://{}", addr);

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Web server shutting down gracefully");
            })
            .await
            .map_err(|e| WebError::ServerError(e.to_string()))
    }
}
