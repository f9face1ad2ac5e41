//! Job Service Client: the single point of entry for all calls to the
//! job-search service and the CV-parsing service.
//!
//! No other module talks HTTP to either service. Callers depend on the
//! `JobService` / `ResumeMatcher` traits so the offline provider and test
//! fakes can stand in.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response, Url,
};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::models::job::{JobDetail, JobSummary};
use crate::models::query::SearchQuery;
use crate::models::upload::UploadedFile;

#[derive(Debug, Error)]
pub enum JobServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    #[error("Job {0} not found")]
    NotFound(String),
}

/// Read side of the job-search service.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Unfiltered default listing.
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, JobServiceError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobSummary>, JobServiceError>;

    async fn suggest(&self, partial: &str) -> Result<Vec<String>, JobServiceError>;

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, JobServiceError>;
}

/// CV-parsing service: turns an uploaded resume into matching jobs.
#[async_trait]
pub trait ResumeMatcher: Send + Sync {
    async fn match_resume(&self, file: &UploadedFile) -> Result<Vec<JobSummary>, JobServiceError>;
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ResumeMatchEnvelope {
    search_engine_result: ResultsEnvelope<JobSummary>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
}

/// HTTP client for both upstream services.
#[derive(Clone)]
pub struct JobApiClient {
    client: Client,
    job_service_url: String,
    cv_service_url: String,
}

impl JobApiClient {
    pub fn new(
        job_service_url: String,
        cv_service_url: String,
        timeout: Duration,
    ) -> Result<Self, JobServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            job_service_url,
            cv_service_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, JobServiceError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .query(params)
            .header("accept", "application/json")
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl JobService for JobApiClient {
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, JobServiceError> {
        let url = endpoint(&self.job_service_url, &["api", "jobs"])?;
        let envelope: ResultsEnvelope<JobSummary> = self.get_json(url, &[]).await?;
        Ok(envelope.results)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobSummary>, JobServiceError> {
        let url = endpoint(&self.job_service_url, &["api", "search"])?;
        let envelope: ResultsEnvelope<JobSummary> = self.get_json(url, &query.to_params()).await?;
        Ok(envelope.results)
    }

    async fn suggest(&self, partial: &str) -> Result<Vec<String>, JobServiceError> {
        let url = endpoint(&self.job_service_url, &["api", "suggest"])?;
        let envelope: ResultsEnvelope<String> = self
            .get_json(url, &[("query", partial.to_string())])
            .await?;
        Ok(envelope.results)
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, JobServiceError> {
        let url = endpoint(&self.job_service_url, &["api", "jobs", job_id])?;
        self.get_json(url, &[]).await
    }
}

#[async_trait]
impl ResumeMatcher for JobApiClient {
    async fn match_resume(&self, file: &UploadedFile) -> Result<Vec<JobSummary>, JobServiceError> {
        let url = endpoint(&self.cv_service_url, &["process-resume"])?;
        let part = Part::bytes(file.payload.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        debug!("POST {url} ({} bytes)", file.size());
        let response = self.client.post(url).multipart(form).send().await?;
        let envelope: ResumeMatchEnvelope = decode(response).await?;
        Ok(envelope.search_engine_result.results)
    }
}

/// Joins path segments onto a base URL, percent-encoding each segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, JobServiceError> {
    let mut url =
        Url::parse(base).map_err(|e| JobServiceError::InvalidUrl(format!("'{base}': {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| JobServiceError::InvalidUrl(format!("'{base}' cannot be a base")))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, JobServiceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ServiceErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        return Err(JobServiceError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
