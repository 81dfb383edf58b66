//! Application state shared across components.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::stories::StoryCache;

/// Health status of a service.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Starting,
    Active,
    Disabled,
    Error,
}

/// A timestamped status entry for a service.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub status: ServiceStatus,
    pub updated_at: Instant,
}

/// Thread-safe registry for services to self-report their health status.
#[derive(Debug, Clone, Default)]
pub struct ServiceStatusRegistry {
    inner: Arc<DashMap<String, StatusEntry>>,
}

impl ServiceStatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates the status for a named service.
    pub fn set(&self, name: &str, status: ServiceStatus) {
        self.inner.insert(
            name.to_owned(),
            StatusEntry {
                status,
                updated_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<ServiceStatus> {
        self.inner.get(name).map(|entry| entry.status.clone())
    }

    /// Snapshot of all service statuses.
    pub fn all(&self) -> Vec<(String, ServiceStatus)> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().status.clone()))
            .collect()
    }
}

/// Request-count bounds applied by the web layer.
#[derive(Debug, Clone, Copy)]
pub struct StoryLimits {
    pub default_count: usize,
    pub max_count: usize,
}

impl StoryLimits {
    /// Default when absent, clamped to the maximum.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_count).min(self.max_count)
    }
}

impl From<&Config> for StoryLimits {
    fn from(config: &Config) -> Self {
        Self {
            default_count: config.default_story_count,
            max_count: config.max_story_count,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub story_cache: StoryCache,
    pub limits: StoryLimits,
    pub service_statuses: ServiceStatusRegistry,
}

impl AppState {
    pub fn new(story_cache: StoryCache, limits: StoryLimits) -> Self {
        Self {
            story_cache,
            limits,
            service_statuses: ServiceStatusRegistry::new(),
        }
    }
}
