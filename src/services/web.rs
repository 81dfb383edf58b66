use anyhow::Context;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, trace};

use crate::services::Service;
use crate::state::{AppState, ServiceStatus};
use crate::web::create_router;

pub const SERVICE_NAME: &str = "web";

/// Serves the HTTP API until shutdown.
pub struct WebService {
    port: u16,
    app_state: AppState,
}

impl WebService {
    pub fn new(port: u16, app_state: AppState) -> Self {
        Self { port, app_state }
    }
}

#[async_trait]
impl Service for WebService {
    async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<(), anyhow::Error> {
        let statuses = self.app_state.service_statuses.clone();
        statuses.set(SERVICE_NAME, ServiceStatus::Starting);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                statuses.set(SERVICE_NAME, ServiceStatus::Error);
                return Err(e).with_context(|| format!("Failed to bind web server to {addr}"));
            }
        };
        info!(
            address = %addr,
            link = format!("http://localhost:{}", self.port),
            "web server listening"
        );
        statuses.set(SERVICE_NAME, ServiceStatus::Active);

        let app = create_router(self.app_state.clone());
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                trace!("web server received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                statuses.set(SERVICE_NAME, ServiceStatus::Disabled);
                info!("web server stopped");
                Ok(())
            }
            Err(e) => {
                statuses.set(SERVICE_NAME, ServiceStatus::Error);
                Err(e).context("Web server failed")
            }
        }
    }
}
