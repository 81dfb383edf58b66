use anyhow::Context;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::hn::HackerNewsApi;
use crate::services::manager::ServiceManager;
use crate::services::web::{self, WebService};
use crate::state::{AppState, StoryLimits};
use crate::stories::{Aggregator, StoryCache};
use crate::utils::fmt_duration;

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
    service_manager: ServiceManager,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let hn_api = HackerNewsApi::new(&config.hn_base_url, config.hn_request_timeout)
            .context("Failed to create Hacker News client")?;
        info!(
            base_url = %config.hn_base_url,
            request_timeout = fmt_duration(config.hn_request_timeout),
            "Hacker News client ready"
        );

        let story_cache = StoryCache::with_stale_policy(
            Aggregator::from_source(Arc::new(hn_api)),
            config.cache_ttl,
            config.stale_policy(),
        );
        info!(
            ttl = fmt_duration(config.cache_ttl),
            stale_policy = ?config.stale_policy(),
            default_count = config.default_story_count,
            max_count = config.max_story_count,
            "Story cache configured"
        );

        if config.warm_cache {
            // Non-fatal: the first request retries the refresh.
            match story_cache.get_top_n(0).await {
                Ok(_) => info!(stories = story_cache.status().stories, "Story cache warmed"),
                Err(e) => warn!(
                    error = ?anyhow::Error::new(e),
                    "Failed to warm story cache (non-fatal)"
                ),
            }
        }

        let app_state = AppState::new(story_cache, StoryLimits::from(&config));

        Ok(App {
            config,
            app_state,
            service_manager: ServiceManager::new(),
        })
    }

    /// Register the web service.
    pub fn setup_services(&mut self) -> Result<(), anyhow::Error> {
        let web_service = Box::new(WebService::new(self.config.port, self.app_state.clone()));
        self.service_manager
            .register_service(web::SERVICE_NAME, web_service);

        if !self.service_manager.has_services() {
            anyhow::bail!("No services enabled");
        }
        Ok(())
    }

    /// Start all registered services
    pub fn start_services(&mut self) {
        self.service_manager.spawn_all();
    }

    /// Run the application and handle shutdown signals
    pub async fn run(self) -> ExitCode {
        use crate::services::signals::handle_shutdown_signals;
        handle_shutdown_signals(self.service_manager, self.config.shutdown_timeout).await
    }
}
