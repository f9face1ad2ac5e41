use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::detail::DetailLoader;
use crate::job_client::{JobApiClient, JobService, ResumeMatcher};
use crate::offline::{OfflineCatalog, OfflineJobService};
use crate::session::{SessionSettings, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    /// Detail lookups are stateless per user, so one loader serves everyone.
    pub details: Arc<DetailLoader>,
}

impl AppState {
    /// Wires each upstream to the HTTP client when its URL is set, or to the
    /// offline catalog when it is not.
    pub fn build(config: Config, offline: Arc<dyn OfflineCatalog>) -> Result<Self> {
        let client = JobApiClient::new(
            config.job_service_url.clone(),
            config.cv_service_url.clone(),
            config.request_timeout,
        )
        .context("Failed to build HTTP client")?;
        let offline_service = Arc::new(OfflineJobService::new(offline.clone()));

        let jobs: Arc<dyn JobService> = if config.job_service_offline() {
            info!("JOB_SERVICE_URL not set; serving jobs from the offline catalog");
            offline_service.clone()
        } else {
            info!("Job service: {}", config.job_service_url);
            Arc::new(client.clone())
        };
        let matcher: Arc<dyn ResumeMatcher> = if config.cv_service_offline() {
            info!("CV_SERVICE_URL not set; CV matching returns the offline listing");
            offline_service
        } else {
            info!("CV service: {}", config.cv_service_url);
            Arc::new(client)
        };

        let settings = SessionSettings {
            suggest_debounce: config.suggest_debounce,
            num_results: config.search_num_results,
        };

        Ok(Self {
            sessions: Arc::new(SessionStore::new(jobs.clone(), matcher, settings)),
            details: Arc::new(DetailLoader::new(jobs, offline)),
            config,
        })
    }
}
