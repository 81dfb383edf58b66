use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::services::Service;
use crate::utils::fmt_duration;

type ServiceOutcome = (&'static str, Result<(), anyhow::Error>);

/// Owns registered services, spawns them, and coordinates their shutdown.
pub struct ServiceManager {
    pending: Vec<(&'static str, Box<dyn Service>)>,
    running: JoinSet<ServiceOutcome>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            pending: Vec::new(),
            running: JoinSet::new(),
            shutdown_tx,
        }
    }

    pub fn register_service(&mut self, name: &'static str, service: Box<dyn Service>) {
        debug!(service = name, "Service registered");
        self.pending.push((name, service));
    }

    pub fn has_services(&self) -> bool {
        !self.pending.is_empty() || !self.running.is_empty()
    }

    /// Spawn every registered service onto the runtime.
    pub fn spawn_all(&mut self) {
        for (name, mut service) in self.pending.drain(..) {
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.running
                .spawn(async move { (name, service.run(shutdown_rx).await) });
            info!(service = name, "Service started");
        }
    }

    /// Wait for the first service to exit on its own.
    ///
    /// Never resolves when nothing is running.
    pub async fn wait_any(&mut self) -> ServiceOutcome {
        match self.running.join_next().await {
            Some(Ok(outcome)) => outcome,
            Some(Err(join_err)) => (
                "unknown",
                Err(anyhow::anyhow!("service task panicked: {join_err}")),
            ),
            None => std::future::pending().await,
        }
    }

    /// Signal all services and wait up to `timeout` for them to finish.
    ///
    /// Returns the elapsed time, or the number of services that had to be aborted.
    pub async fn shutdown(&mut self, timeout: Duration) -> Result<Duration, usize> {
        let start = Instant::now();
        // No receivers just means every service already exited.
        let _ = self.shutdown_tx.send(());

        let drain = async {
            while let Some(joined) = self.running.join_next().await {
                match joined {
                    Ok((name, Ok(()))) => info!(service = name, "Service stopped"),
                    Ok((name, Err(e))) => {
                        error!(service = name, error = ?e, "Service failed during shutdown")
                    }
                    Err(e) => error!(error = ?e, "Service task panicked during shutdown"),
                }
            }
        };

        match tokio::time::timeout(timeout, drain).await {
            Ok(()) => Ok(start.elapsed()),
            Err(_) => {
                let remaining = self.running.len();
                warn!(
                    remaining,
                    timeout = fmt_duration(timeout),
                    "Shutdown timed out, aborting remaining services"
                );
                self.running.abort_all();
                Err(remaining)
            }
        }
    }
}
