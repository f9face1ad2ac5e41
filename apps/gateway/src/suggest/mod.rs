//! Debounced autocomplete.
//!
//! Each call takes the next sequence number. After the debounce window only
//! the holder of the latest number issues a request, and a response is only
//! applied if its number is still the latest when it arrives. Failures yield
//! an empty list and are never surfaced. Repeating the last successfully
//! fetched query re-applies its suggestions without another request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::job_client::JobService;

/// Queries shorter than this (after trimming) never reach the network.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuggestionOutcome {
    Applied {
        query: String,
        suggestions: Vec<String>,
    },
    /// A newer keystroke arrived before this one completed.
    Superseded { query: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppliedSuggestions {
    pub query: String,
    pub suggestions: Vec<String>,
}

#[derive(Default)]
struct AppliedState {
    view: AppliedSuggestions,
    /// Set only when `view` came back from the service.
    fetched: bool,
}

pub struct SuggestionFetcher {
    service: Arc<dyn JobService>,
    debounce: Duration,
    latest_seq: AtomicU64,
    applied: Mutex<AppliedState>,
}

impl SuggestionFetcher {
    pub fn new(service: Arc<dyn JobService>, debounce: Duration) -> Self {
        Self {
            service,
            debounce,
            latest_seq: AtomicU64::new(0),
            applied: Mutex::new(AppliedState::default()),
        }
    }

    pub async fn request(&self, query: &str) -> SuggestionOutcome {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let trimmed = query.trim();

        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return self.apply(seq, query, Vec::new(), false);
        }

        tokio::time::sleep(self.debounce).await;
        if !self.is_latest(seq) {
            debug!("suggestion request #{seq} for '{trimmed}' debounced away");
            return SuggestionOutcome::Superseded {
                query: query.to_string(),
            };
        }

        if let Some(cached) = self.cached(trimmed) {
            debug!("suggestions for '{trimmed}' unchanged, skipping request");
            return self.apply(seq, query, cached, true);
        }

        match self.service.suggest(trimmed).await {
            Ok(suggestions) => self.apply(seq, query, suggestions, true),
            Err(e) => {
                debug!("suggestions for '{trimmed}' unavailable: {e}");
                self.apply(seq, query, Vec::new(), false)
            }
        }
    }

    /// The last suggestions that were applied, keyed by their query.
    pub fn current(&self) -> AppliedSuggestions {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .view
            .clone()
    }

    fn cached(&self, trimmed: &str) -> Option<Vec<String>> {
        let applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
        (applied.fetched && applied.view.query.trim() == trimmed)
            .then(|| applied.view.suggestions.clone())
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest_seq.load(Ordering::SeqCst) == seq
    }

    fn apply(
        &self,
        seq: u64,
        query: &str,
        suggestions: Vec<String>,
        fetched: bool,
    ) -> SuggestionOutcome {
        let mut applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
        // Checked under the lock so an older response can never land after a newer one.
        if !self.is_latest(seq) {
            debug!("discarding stale suggestions #{seq} for '{}'", query.trim());
            return SuggestionOutcome::Superseded {
                query: query.to_string(),
            };
        }
        *applied = AppliedState {
            view: AppliedSuggestions {
                query: query.to_string(),
                suggestions: suggestions.clone(),
            },
            fetched,
        };
        SuggestionOutcome::Applied {
            query: query.to_string(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeJobService;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_short_queries_return_empty_without_network() {
        let service = Arc::new(FakeJobService::default());
        let fetcher = SuggestionFetcher::new(service.clone(), DEBOUNCE);

        for query in ["", " ", "w", "  w  "] {
            let outcome = fetcher.request(query).await;
            assert_eq!(
                outcome,
                SuggestionOutcome::Applied {
                    query: query.to_string(),
                    suggestions: vec![]
                }
            );
        }
        assert!(service.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_keystrokes_issue_one_request_for_final_value() {
        let service = Arc::new(FakeJobService::default());
        let fetcher = Arc::new(SuggestionFetcher::new(service.clone(), DEBOUNCE));

        let mut handles = Vec::new();
        for query in ["we", "web", "web d", "web dev"] {
            let fetcher = fetcher.clone();
            handles.push(tokio::spawn(async move { fetcher.request(query).await }));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(service.calls(), vec!["suggest:web dev"]);
        assert!(outcomes[..3]
            .iter()
            .all(|o| matches!(o, SuggestionOutcome::Superseded { .. })));
        assert_eq!(
            outcomes[3],
            SuggestionOutcome::Applied {
                query: "web dev".to_string(),
                suggestions: vec!["web dev developer".to_string()]
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_does_not_overwrite_newer_suggestions() {
        let service = Arc::new(
            FakeJobService::default().with_delay("slow", Duration::from_millis(1_000)),
        );
        let fetcher = Arc::new(SuggestionFetcher::new(service.clone(), DEBOUNCE));

        let slow = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.request("slow").await })
        };
        // Past the debounce window, so "slow" is already in flight.
        tokio::time::sleep(Duration::from_millis(400)).await;
        let fast = fetcher.request("fast").await;
        let slow = slow.await.unwrap();

        assert_eq!(service.calls(), vec!["suggest:slow", "suggest:fast"]);
        assert!(matches!(fast, SuggestionOutcome::Applied { .. }));
        assert!(matches!(slow, SuggestionOutcome::Superseded { .. }));
        assert_eq!(fetcher.current().query, "fast");
        assert_eq!(fetcher.current().suggestions, vec!["fast developer"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_swallowed_as_empty() {
        let service = Arc::new(FakeJobService::default());
        service.set_failing(true);
        let fetcher = SuggestionFetcher::new(service.clone(), DEBOUNCE);

        let outcome = fetcher.request("web").await;
        assert_eq!(
            outcome,
            SuggestionOutcome::Applied {
                query: "web".to_string(),
                suggestions: vec![]
            }
        );
        assert_eq!(service.calls(), vec!["suggest:web"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_query_reuses_last_suggestions() {
        let service = Arc::new(FakeJobService::default());
        let fetcher = SuggestionFetcher::new(service.clone(), DEBOUNCE);

        let first = fetcher.request("web").await;
        let second = fetcher.request(" web ").await;

        assert_eq!(service.calls(), vec!["suggest:web"]);
        assert!(matches!(first, SuggestionOutcome::Applied { .. }));
        assert_eq!(
            second,
            SuggestionOutcome::Applied {
                query: " web ".to_string(),
                suggestions: vec!["web developer".to_string()]
            }
        );

        fetcher.request("java").await;
        fetcher.request("web").await;
        assert_eq!(
            service.calls(),
            vec!["suggest:web", "suggest:java", "suggest:web"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_query_is_retried_on_repeat() {
        let service = Arc::new(FakeJobService::default());
        service.set_failing(true);
        let fetcher = SuggestionFetcher::new(service.clone(), DEBOUNCE);

        fetcher.request("web").await;
        service.set_failing(false);
        let retried = fetcher.request("web").await;

        assert_eq!(service.calls(), vec!["suggest:web", "suggest:web"]);
        assert_eq!(fetcher.current().suggestions, vec!["web developer"]);
        assert!(matches!(retried, SuggestionOutcome::Applied { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_input_supersedes_in_flight_request() {
        let service = Arc::new(
            FakeJobService::default().with_delay("web", Duration::from_millis(500)),
        );
        let fetcher = Arc::new(SuggestionFetcher::new(service.clone(), DEBOUNCE));

        let typed = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.request("web").await })
        };
        tokio::time::sleep(Duration::from_millis(400)).await;
        fetcher.request("").await;

        assert!(matches!(
            typed.await.unwrap(),
            SuggestionOutcome::Superseded { .. }
        ));
        assert!(fetcher.current().suggestions.is_empty());
    }
}
