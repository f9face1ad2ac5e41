//! Result Renderer: maps search state onto exactly one view.

use reqwest::Url;
use serde::Serialize;

use crate::models::job::JobSummary;
use crate::search::SearchMode;

pub const NO_CV_MATCHES_MESSAGE: &str = "No matching jobs found for your CV.";

/// A job card in the results grid. `href` is the only thing selection carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobCard {
    #[serde(flatten)]
    pub job: JobSummary,
    pub href: String,
}

impl From<&JobSummary> for JobCard {
    fn from(job: &JobSummary) -> Self {
        Self {
            href: job_href(&job.job_id),
            job: job.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultView {
    /// Nothing searched yet.
    Idle,
    Loading,
    Error { message: String },
    Empty { message: String },
    Grid { total: usize, cards: Vec<JobCard> },
}

/// Everything the renderer looks at.
pub struct RenderInput<'a> {
    pub mode: SearchMode,
    pub query: &'a str,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub results: &'a [JobSummary],
    pub attempted: bool,
}

pub fn render(input: &RenderInput<'_>) -> ResultView {
    if input.loading {
        return ResultView::Loading;
    }
    if let Some(message) = input.error {
        return ResultView::Error {
            message: message.to_string(),
        };
    }
    if input.results.is_empty() {
        if !input.attempted {
            return ResultView::Idle;
        }
        let message = match input.mode {
            SearchMode::Text => format!("No results found for \"{}\"", input.query.trim()),
            SearchMode::File => NO_CV_MATCHES_MESSAGE.to_string(),
        };
        return ResultView::Empty { message };
    }
    ResultView::Grid {
        total: input.results.len(),
        cards: input.results.iter().map(JobCard::from).collect(),
    }
}

/// Relative link to a job's detail page, the id encoded as one path segment.
pub fn job_href(job_id: &str) -> String {
    let mut url = Url::parse("http://localhost/job").expect("detail route base is a valid URL");
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(job_id);
    }
    url.path().to_string()
}
