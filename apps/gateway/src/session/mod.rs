//! Per-user session context.
//!
//! A session owns the uploaded CV, the search orchestrator and the
//! suggestion fetcher. The file is only ever changed through
//! `Session::replace_file`, which also re-derives file-mode results.
//! Sessions not looked up within the idle TTL are swept from the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::files::FileHolder;
use crate::job_client::{JobService, ResumeMatcher};
use crate::models::query::{SearchFilters, SortMode};
use crate::models::upload::{UploadedFile, UploadedFileInfo};
use crate::search::{SearchMode, SearchOrchestrator, SearchSnapshot, TextSearch};
use crate::suggest::{AppliedSuggestions, SuggestionFetcher, SuggestionOutcome};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub suggest_debounce: Duration,
    pub num_results: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub file: Option<UploadedFileInfo>,
    pub suggestions: AppliedSuggestions,
    #[serde(flatten)]
    pub search: SearchSnapshot,
}

/// Upper bound on how often the sweeper wakes up.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_seen: Mutex<Instant>,
    files: FileHolder,
    search: SearchOrchestrator,
    suggestions: SuggestionFetcher,
}

impl Session {
    fn new(
        id: Uuid,
        jobs: Arc<dyn JobService>,
        matcher: Arc<dyn ResumeMatcher>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            last_seen: Mutex::new(Instant::now()),
            files: FileHolder::new(),
            search: SearchOrchestrator::new(jobs.clone(), matcher, settings.num_results),
            suggestions: SuggestionFetcher::new(jobs, settings.suggest_debounce),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.wrap(self.search.snapshot())
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }

    /// Resets the search state, then re-derives from the held file when
    /// entering file mode.
    pub async fn switch_mode(&self, mode: SearchMode) -> SessionSnapshot {
        let snapshot = self.search.switch_mode(mode);
        if mode == SearchMode::File {
            return self.wrap(self.search.search_file(&self.files).await);
        }
        self.wrap(snapshot)
    }

    pub async fn search_text(&self, request: TextSearch) -> Result<SessionSnapshot, AppError> {
        Ok(self.wrap(self.search.search_text(request).await?))
    }

    pub async fn apply_filters(
        &self,
        filters: SearchFilters,
        sort: SortMode,
    ) -> Result<SessionSnapshot, AppError> {
        Ok(self.wrap(self.search.apply_filters(filters, sort).await?))
    }

    pub async fn suggest(&self, query: &str) -> SuggestionOutcome {
        self.suggestions.request(query).await
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.search.recent_searches()
    }

    /// The only way to change the session's CV. `None` clears it and
    /// empties file-mode results before returning.
    pub async fn replace_file(&self, file: Option<UploadedFile>) -> SessionSnapshot {
        match self.files.set(file) {
            Some(stored) => info!(
                "session {} holds '{}' ({} bytes, revision {})",
                self.id,
                stored.name,
                stored.size(),
                stored.revision
            ),
            None => info!("session {} cleared its CV", self.id),
        }
        self.wrap(self.search.search_file(&self.files).await)
    }

    fn wrap(&self, search: SearchSnapshot) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            file: self.files.get().map(|f| f.metadata()),
            suggestions: self.suggestions.current(),
            search,
        }
    }
}

/// All live sessions, keyed by id.
pub struct SessionStore {
    jobs: Arc<dyn JobService>,
    matcher: Arc<dyn ResumeMatcher>,
    settings: SessionSettings,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionStore {
    pub fn new(
        jobs: Arc<dyn JobService>,
        matcher: Arc<dyn ResumeMatcher>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            jobs,
            matcher,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(
            Uuid::new_v4(),
            self.jobs.clone(),
            self.matcher.clone(),
            self.settings,
        ));
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session.id(), session.clone());
        info!("session {} created", session.id());
        session
    }

    /// Looks up a session and marks it as active.
    pub fn get(&self, id: Uuid) -> Result<Arc<Session>, AppError> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.touch();
        Ok(session)
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        match removed {
            Some(_) => {
                info!("session {id} closed");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {id} not found"))),
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drops every session idle for at least `ttl`. Returns how many went.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|id, session| {
            let idle = session.idle_for();
            if idle < ttl {
                return true;
            }
            info!("session {id} expired after {}s idle", idle.as_secs());
            false
        });
        before - sessions.len()
    }

    /// Runs `evict_idle` periodically until the returned task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, ttl: Duration) -> JoinHandle<()> {
        let period = (ttl / 2).clamp(Duration::from_secs(1), MAX_SWEEP_PERIOD);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle(ttl);
                if evicted > 0 {
                    debug!("swept {evicted} idle sessions, {} remain", self.count());
                }
            }
        })
    }
}
