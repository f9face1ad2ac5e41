//! Detail Loader: resolves a job id to a full record, falling back to the
//! offline catalog when the job service fails.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::job_client::JobService;
use crate::models::job::JobDetail;
use crate::offline::OfflineCatalog;

pub const FALLBACK_WARNING: &str = "Showing cached job details; the job service is unavailable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSource {
    Remote,
    /// Bundled record for the requested id.
    Fallback,
    /// No bundled record for the id; the generic placeholder is shown.
    Generic,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub job: JobDetail,
    pub source: DetailSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub struct DetailLoader {
    jobs: Arc<dyn JobService>,
    offline: Arc<dyn OfflineCatalog>,
    in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DetailLoader {
    pub fn new(jobs: Arc<dyn JobService>, offline: Arc<dyn OfflineCatalog>) -> Self {
        Self {
            jobs,
            offline,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while any load is running. Cleared even if the caller drops
    /// the future mid-request.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Never fails: a fetch error degrades to a fallback record plus warning.
    pub async fn load(&self, job_id: &str) -> DetailView {
        let _loading = InFlight::enter(&self.in_flight);

        match self.jobs.job_detail(job_id).await {
            Ok(job) => {
                debug!("job {} loaded from the job service", job.job_id());
                DetailView {
                    job,
                    source: DetailSource::Remote,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("job {job_id} detail fetch failed, using fallback: {e}");
                let (job, source) = match self.offline.detail(job_id) {
                    Some(job) => (job, DetailSource::Fallback),
                    None => (self.offline.generic_detail(), DetailSource::Generic),
                };
                DetailView {
                    job,
                    source,
                    warning: Some(FALLBACK_WARNING.to_string()),
                }
            }
        }
    }
}
