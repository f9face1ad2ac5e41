//! Deterministic stand-ins for the upstream services, shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::job_client::{JobService, JobServiceError, ResumeMatcher};
use crate::models::job::{JobDetail, JobSummary};
use crate::models::query::SearchQuery;
use crate::models::upload::UploadedFile;

/// Records every call as `"<op>:<arg>"`, optionally sleeps per argument,
/// and fails every call while `failing` is set.
#[derive(Default)]
pub struct FakeJobService {
    jobs: Vec<JobSummary>,
    details: HashMap<String, JobDetail>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl FakeJobService {
    pub fn with_jobs(jobs: Vec<JobSummary>) -> Self {
        Self {
            jobs,
            ..Default::default()
        }
    }

    pub fn with_detail(mut self, detail: JobDetail) -> Self {
        self.details.insert(detail.job_id().to_string(), detail);
        self
    }

    /// Delay applied to calls whose argument equals `arg`.
    pub fn with_delay(mut self, arg: &str, delay: Duration) -> Self {
        self.delays.insert(arg.to_string(), delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, op: &str, arg: &str) -> Result<(), JobServiceError> {
        self.calls.lock().unwrap().push(format!("{op}:{arg}"));
        if let Some(delay) = self.delays.get(arg) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(JobServiceError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl JobService for FakeJobService {
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, JobServiceError> {
        self.record("list", "").await?;
        Ok(self.jobs.clone())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobSummary>, JobServiceError> {
        self.record("search", &query.text).await?;
        Ok(self
            .jobs
            .iter()
            .filter(|j| j.matches_text(&query.text))
            .cloned()
            .collect())
    }

    async fn suggest(&self, partial: &str) -> Result<Vec<String>, JobServiceError> {
        self.record("suggest", partial).await?;
        Ok(vec![format!("{partial} developer")])
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, JobServiceError> {
        self.record("detail", job_id).await?;
        self.details
            .get(job_id)
            .cloned()
            .ok_or_else(|| JobServiceError::NotFound(job_id.to_string()))
    }
}

#[async_trait]
impl ResumeMatcher for FakeJobService {
    async fn match_resume(&self, file: &UploadedFile) -> Result<Vec<JobSummary>, JobServiceError> {
        self.record("match", &file.name).await?;
        Ok(self.jobs.clone())
    }
}

pub fn summary(job_id: &str, title: &str, company: &str) -> JobSummary {
    JobSummary {
        job_id: job_id.to_string(),
        job_title: title.to_string(),
        company: company.to_string(),
        location: "Jakarta Selatan".to_string(),
        country: "Indonesia".to_string(),
        salary_range: "8M-10M/month".to_string(),
        work_type: "Full-time".to_string(),
    }
}

pub fn pdf(name: &str) -> UploadedFile {
    UploadedFile::from_upload(name, Some("application/pdf"), Bytes::from_static(b"%PDF-1.7"))
        .expect("valid pdf fixture")
}
