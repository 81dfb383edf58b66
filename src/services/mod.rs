//! Long-running services and their lifecycle.

use async_trait::async_trait;
use tokio::sync::broadcast;

pub mod manager;
pub mod signals;
pub mod web;

/// A component that runs until it fails or is told to shut down.
#[async_trait]
pub trait Service: Send {
    /// Run until `shutdown_rx` fires or an unrecoverable error occurs.
    async fn run(&mut self, shutdown_rx: broadcast::Receiver<()>) -> Result<(), anyhow::Error>;
}
