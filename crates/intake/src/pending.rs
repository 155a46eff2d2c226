//! Paths currently claimed by a worker.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared set of paths being processed.
#[derive(Debug, Clone, Default)]
pub struct PendingSet {
    inner: Arc<Mutex<HashSet<PathBuf>>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path` if no one else holds it. The claim is released when the
    /// returned guard is dropped.
    pub fn try_claim(&self, path: &Path) -> Option<PendingClaim> {
        if !self.lock().insert(path.to_path_buf()) {
            return None;
        }
        Some(PendingClaim {
            set: Arc::clone(&self.inner),
            path: path.to_path_buf(),
        })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive hold on one pending path.
#[derive(Debug)]
pub struct PendingClaim {
    set: Arc<Mutex<HashSet<PathBuf>>>,
    path: PathBuf,
}

impl PendingClaim {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PendingClaim {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.path);
    }
}
