//! Offline data provider: the bundled job tables used when a service is not
//! configured, and as fallback records when a detail fetch fails.
//!
//! `AppState` carries an `Arc<dyn OfflineCatalog>`; tests inject their own.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::job_client::{JobService, JobServiceError, ResumeMatcher};
use crate::models::job::{CompanyProfile, JobDetail, JobSummary};
use crate::models::query::SearchQuery;
use crate::models::upload::UploadedFile;

const MAX_OFFLINE_SUGGESTIONS: usize = 5;

/// Locally bundled job data.
pub trait OfflineCatalog: Send + Sync {
    fn listing(&self) -> Vec<JobSummary>;

    /// The fallback record for a specific id, if one is bundled.
    fn detail(&self, job_id: &str) -> Option<JobDetail>;

    /// Shown when no record exists for the requested id.
    fn generic_detail(&self) -> JobDetail;
}

pub struct MockCatalog {
    jobs: Vec<JobSummary>,
    details: HashMap<String, JobDetail>,
    generic: JobDetail,
}

impl MockCatalog {
    pub fn new(jobs: Vec<JobSummary>, details: Vec<JobDetail>, generic: JobDetail) -> Self {
        Self {
            jobs,
            details: details
                .into_iter()
                .map(|d| (d.job_id().to_string(), d))
                .collect(),
            generic,
        }
    }

    /// Six "Web Developer" postings and a full record for job "1", which
    /// doubles as the generic fallback.
    pub fn bundled() -> Self {
        let jobs: Vec<JobSummary> = (1..=6).map(|i| web_developer(&i.to_string())).collect();
        let first = bundled_detail();
        Self::new(jobs, vec![first.clone()], first)
    }
}

impl OfflineCatalog for MockCatalog {
    fn listing(&self) -> Vec<JobSummary> {
        self.jobs.clone()
    }

    fn detail(&self, job_id: &str) -> Option<JobDetail> {
        self.details.get(job_id).cloned()
    }

    fn generic_detail(&self) -> JobDetail {
        self.generic.clone()
    }
}

fn web_developer(job_id: &str) -> JobSummary {
    JobSummary {
        job_id: job_id.to_string(),
        job_title: "Web Developer".to_string(),
        company: "PT Awan Hujan".to_string(),
        location: "Jakarta Selatan".to_string(),
        country: "Indonesia".to_string(),
        salary_range: "8M-10M/month".to_string(),
        work_type: "Full-time".to_string(),
    }
}

fn bundled_detail() -> JobDetail {
    JobDetail {
        summary: web_developer("1"),
        job_description: "We are looking for a skilled Web Developer to join our dynamic team. \
            You will be responsible for developing and maintaining web applications using \
            modern technologies and frameworks."
            .to_string(),
        responsibilities: vec![
            "Develop and maintain web applications".to_string(),
            "Build user interfaces with React.js or Vue.js".to_string(),
            "Implement backend services with Node.js and Express.js".to_string(),
            "Design and query MySQL and MongoDB databases".to_string(),
            "Collaborate through Git-based code review".to_string(),
        ],
        benefits: vec![
            "Competitive salary package".to_string(),
            "Health insurance coverage".to_string(),
            "Flexible working hours".to_string(),
            "Professional development opportunities".to_string(),
            "Team building activities".to_string(),
            "Modern office environment".to_string(),
        ],
        qualifications: "Bachelor's degree in Computer Science or related field".to_string(),
        experience: "2+ years of experience in web development".to_string(),
        skills: "HTML, CSS, JavaScript, React.js, Vue.js, Node.js, Express.js, MySQL, MongoDB, Git"
            .to_string(),
        company_profile: CompanyProfile {
            city: "Jakarta Selatan".to_string(),
            state: "DKI Jakarta".to_string(),
            sector: "Information Technology".to_string(),
            industry: "Technology".to_string(),
            ..Default::default()
        },
        job_posting_date: "2024-05-20".to_string(),
        latitude: -6.2615,
        longitude: 106.8106,
        company_size: Some(100),
        preference: None,
        contact_person: None,
        contact: None,
        role: Some("Web Developer".to_string()),
        job_portal: None,
    }
}

/// Serves the job-search and CV-matching contracts from an `OfflineCatalog`.
/// Selected at startup when the corresponding service URL is empty.
pub struct OfflineJobService {
    catalog: Arc<dyn OfflineCatalog>,
}

impl OfflineJobService {
    pub fn new(catalog: Arc<dyn OfflineCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl JobService for OfflineJobService {
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, JobServiceError> {
        Ok(self.catalog.listing())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<JobSummary>, JobServiceError> {
        Ok(self
            .catalog
            .listing()
            .into_iter()
            .filter(|job| job.matches_text(&query.text))
            .take(query.num_results as usize)
            .collect())
    }

    async fn suggest(&self, partial: &str) -> Result<Vec<String>, JobServiceError> {
        let needle = partial.trim().to_lowercase();
        let mut suggestions: Vec<String> = Vec::new();
        for job in self.catalog.listing() {
            for candidate in [job.job_title, job.company] {
                if candidate.to_lowercase().contains(&needle) && !suggestions.contains(&candidate) {
                    suggestions.push(candidate);
                }
            }
        }
        suggestions.truncate(MAX_OFFLINE_SUGGESTIONS);
        Ok(suggestions)
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, JobServiceError> {
        self.catalog
            .detail(job_id)
            .ok_or_else(|| JobServiceError::NotFound(job_id.to_string()))
    }
}

#[async_trait]
impl ResumeMatcher for OfflineJobService {
    async fn match_resume(&self, _file: &UploadedFile) -> Result<Vec<JobSummary>, JobServiceError> {
        Ok(self.catalog.listing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::{SearchFilters, SortMode};

    fn service() -> OfflineJobService {
        OfflineJobService::new(Arc::new(MockCatalog::bundled()))
    }

    fn query(text: &str) -> SearchQuery {
        SearchQuery {
            text: text.to_string(),
            filters: SearchFilters::default(),
            sort: SortMode::Relevance,
            num_results: 20,
        }
    }

    #[test]
    fn test_bundled_catalog_has_six_web_developer_postings() {
        let catalog = MockCatalog::bundled();
        let listing = catalog.listing();
        assert_eq!(listing.len(), 6);
        assert!(listing
            .iter()
            .all(|j| j.job_title == "Web Developer" && j.company == "PT Awan Hujan"));
        let ids: Vec<&str> = listing.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_generic_detail_is_job_one() {
        let catalog = MockCatalog::bundled();
        assert_eq!(catalog.generic_detail().job_id(), "1");
        assert!(catalog.detail("1").is_some());
        assert!(catalog.detail("2").is_none());
    }

    #[tokio::test]
    async fn test_search_filters_by_title_or_company() {
        let svc = service();
        assert_eq!(svc.search(&query("Web Developer")).await.unwrap().len(), 6);
        assert_eq!(svc.search(&query("awan hujan")).await.unwrap().len(), 6);
        assert!(svc.search(&query("Rust")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_result_bound() {
        let mut q = query("web");
        q.num_results = 2;
        assert_eq!(service().search(&q).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_suggest_deduplicates_candidates() {
        let suggestions = service().suggest("we").await.unwrap();
        assert_eq!(suggestions, vec!["Web Developer"]);
    }

    #[tokio::test]
    async fn test_unknown_detail_is_not_found() {
        let err = service().job_detail("404").await.unwrap_err();
        assert!(matches!(err, JobServiceError::NotFound(id) if id == "404"));
    }
}
