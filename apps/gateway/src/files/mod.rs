use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::upload::UploadedFile;

/// Holds at most one uploaded CV for a session.
///
/// Every `set` stamps the file with a fresh revision, so a reader can tell
/// whether the file it started working on is still the current one.
#[derive(Default)]
pub struct FileHolder {
    inner: Mutex<HolderState>,
}

#[derive(Default)]
struct HolderState {
    current: Option<Arc<UploadedFile>>,
    next_revision: u64,
}

impl FileHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held file wholesale, or clears it with `None`.
    /// Returns the stored file.
    pub fn set(&self, file: Option<UploadedFile>) -> Option<Arc<UploadedFile>> {
        let mut state = self.lock();
        state.next_revision += 1;
        let revision = state.next_revision;
        state.current = file.map(|mut f| {
            f.revision = revision;
            Arc::new(f)
        });
        state.current.clone()
    }

    pub fn get(&self) -> Option<Arc<UploadedFile>> {
        self.lock().current.clone()
    }

    /// True while `revision` names the file currently held.
    pub fn is_current(&self, revision: u64) -> bool {
        self.lock()
            .current
            .as_ref()
            .is_some_and(|f| f.revision == revision)
    }

    fn lock(&self) -> MutexGuard<'_, HolderState> {
        // A poisoned holder still contains a consistent Option.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
