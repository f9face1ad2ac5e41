//! Job Search Orchestrator.
//!
//! Two mutually exclusive modes: text search against the job service, and
//! CV matching against the resume service. Every request is tagged with the
//! generation it was issued under; switching modes, clearing the file or
//! issuing a newer request bumps the generation, and responses from an older
//! generation are dropped. File-mode responses are additionally checked
//! against the holder's current file revision.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::files::FileHolder;
use crate::job_client::{JobService, JobServiceError, ResumeMatcher};
use crate::models::job::JobSummary;
use crate::models::query::{SearchFilters, SearchQuery, SortMode};
use crate::render::{render, RenderInput, ResultView};

pub const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch search results. Please try again.";
pub const CV_FAILED_MESSAGE: &str = "Error uploading CV. Please try again.";
const MAX_RECENT_SEARCHES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Text,
    File,
}

/// A text search as submitted by the user. Absent filters/sort keep the
/// session's current ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSearch {
    #[serde(default)]
    pub query: String,
    pub filters: Option<SearchFilters>,
    pub sort: Option<SortMode>,
}

/// What the view layer needs to draw the search page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    pub mode: SearchMode,
    pub query: String,
    pub filters: SearchFilters,
    pub sort: SortMode,
    pub results: ResultView,
}

#[derive(Default)]
struct SearchState {
    mode: SearchMode,
    query: String,
    filters: SearchFilters,
    sort: SortMode,
    results: Vec<JobSummary>,
    error: Option<String>,
    attempted: bool,
    generation: u64,
    loading_for: Option<u64>,
    recent: VecDeque<String>,
}

impl SearchState {
    /// Drops results, error and in-flight work.
    fn reset(&mut self) {
        self.generation += 1;
        self.loading_for = None;
        self.results.clear();
        self.error = None;
        self.attempted = false;
    }

    fn remember(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.recent.retain(|q| q != query);
        self.recent.push_front(query.to_string());
        self.recent.truncate(MAX_RECENT_SEARCHES);
    }

    fn snapshot(&self) -> SearchSnapshot {
        let results = render(&RenderInput {
            mode: self.mode,
            query: &self.query,
            loading: self.loading_for == Some(self.generation),
            error: self.error.as_deref(),
            results: &self.results,
            attempted: self.attempted,
        });
        SearchSnapshot {
            mode: self.mode,
            query: self.query.clone(),
            filters: self.filters.clone(),
            sort: self.sort,
            results,
        }
    }
}

/// Clears the loading flag for its generation on every exit path.
struct LoadingGuard<'a> {
    state: &'a Mutex<SearchState>,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.loading_for == Some(self.generation) {
            state.loading_for = None;
        }
    }
}

pub struct SearchOrchestrator {
    jobs: Arc<dyn JobService>,
    matcher: Arc<dyn ResumeMatcher>,
    num_results: u32,
    state: Mutex<SearchState>,
}

impl SearchOrchestrator {
    pub fn new(jobs: Arc<dyn JobService>, matcher: Arc<dyn ResumeMatcher>, num_results: u32) -> Self {
        Self {
            jobs,
            matcher,
            num_results,
            state: Mutex::new(SearchState::default()),
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.lock().snapshot()
    }

    /// Most recent first, at most five, no duplicates.
    pub fn recent_searches(&self) -> Vec<String> {
        self.lock().recent.iter().cloned().collect()
    }

    /// Resets query, results and error, and orphans anything in flight.
    pub fn switch_mode(&self, mode: SearchMode) -> SearchSnapshot {
        let mut state = self.lock();
        info!("search mode {:?} -> {:?}", state.mode, mode);
        state.reset();
        state.mode = mode;
        state.query.clear();
        state.snapshot()
    }

    /// Empty query loads the default listing; anything else hits search.
    pub async fn search_text(&self, request: TextSearch) -> Result<SearchSnapshot, AppError> {
        let (generation, query) = {
            let mut state = self.lock();
            if state.mode != SearchMode::Text {
                return Err(AppError::Validation(
                    "Text search is unavailable while searching by CV".to_string(),
                ));
            }
            if let Some(filters) = request.filters {
                state.filters = filters;
            }
            if let Some(sort) = request.sort {
                state.sort = sort;
            }
            state.query = request.query.clone();
            state.remember(&request.query);
            let generation = Self::begin(&mut state);
            let query = SearchQuery {
                text: request.query,
                filters: state.filters.clone(),
                sort: state.sort,
                num_results: self.num_results,
            };
            (generation, query)
        };
        let loading = LoadingGuard {
            state: &self.state,
            generation,
        };

        let outcome = if query.text.trim().is_empty() {
            debug!("empty query, loading default listing");
            self.jobs.list_jobs().await
        } else {
            debug!(
                "searching for '{}' (sort {}, filters {})",
                query.text.trim(),
                query.sort.as_str(),
                if query.filters.is_empty() { "none" } else { "set" }
            );
            self.jobs.search(&query).await
        };

        self.finish(generation, outcome, SEARCH_FAILED_MESSAGE, || true);
        drop(loading);
        Ok(self.snapshot())
    }

    /// Re-runs the current text query, if there is one, under new filters.
    pub async fn apply_filters(
        &self,
        filters: SearchFilters,
        sort: SortMode,
    ) -> Result<SearchSnapshot, AppError> {
        let rerun = {
            let mut state = self.lock();
            state.filters = filters;
            state.sort = sort;
            (state.mode == SearchMode::Text && !state.query.trim().is_empty())
                .then(|| state.query.clone())
        };
        match rerun {
            Some(query) => {
                self.search_text(TextSearch {
                    query,
                    filters: None,
                    sort: None,
                })
                .await
            }
            None => Ok(self.snapshot()),
        }
    }

    /// Re-derives file-mode results from whatever the holder has now.
    /// No file means no results and no network call.
    pub async fn search_file(&self, holder: &FileHolder) -> SearchSnapshot {
        let (file, generation) = {
            let mut state = self.lock();
            if state.mode != SearchMode::File {
                return state.snapshot();
            }
            let Some(file) = holder.get() else {
                state.reset();
                return state.snapshot();
            };
            (file, Self::begin(&mut state))
        };
        let loading = LoadingGuard {
            state: &self.state,
            generation,
        };

        debug!("matching jobs for '{}' (revision {})", file.name, file.revision);
        let outcome = self.matcher.match_resume(&file).await;

        self.finish(generation, outcome, CV_FAILED_MESSAGE, || {
            holder.is_current(file.revision)
        });
        drop(loading);
        self.snapshot()
    }

    fn begin(state: &mut SearchState) -> u64 {
        state.generation += 1;
        state.loading_for = Some(state.generation);
        state.error = None;
        state.attempted = true;
        state.generation
    }

    fn finish(
        &self,
        generation: u64,
        outcome: Result<Vec<JobSummary>, JobServiceError>,
        failure_message: &str,
        still_relevant: impl FnOnce() -> bool,
    ) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!("discarding response from superseded search #{generation}");
            return;
        }
        if !still_relevant() {
            // The file it was computed for is gone; nothing has searched the new one.
            debug!("discarding response #{generation} for a replaced file");
            state.results.clear();
            state.error = None;
            state.attempted = false;
            return;
        }
        match outcome {
            Ok(results) => {
                info!("search #{generation} returned {} jobs", results.len());
                state.results = results;
                state.error = None;
            }
            Err(e) => {
                warn!("search #{generation} failed: {e}");
                state.results.clear();
                state.error = Some(failure_message.to_string());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
