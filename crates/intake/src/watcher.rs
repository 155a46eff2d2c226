//! Polling watcher for the camera input directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wildscan_clip_model::is_video_file;
use wildscan_common::{ScannerConfig, WildscanResult};

use crate::pending::PendingSet;
use crate::stability::{wait_until_stable, DEFAULT_STABILITY_TIMEOUT};

/// Shortest allowed delay between directory scans.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches one directory (non-recursive) for new video files.
///
/// Videos already present when the watcher starts are logged and left
/// alone. Each new video is claimed in the [`PendingSet`], waited on until
/// stable, then handed to the callback on a blocking worker thread.
pub struct DirectoryWatcher {
    input_dir: PathBuf,
    poll_interval: Duration,
    stable_for: Duration,
    stability_timeout: Duration,
    stop_flag: Arc<AtomicBool>,
    pending: PendingSet,
    known: HashSet<PathBuf>,
}

impl DirectoryWatcher {
    /// `poll_interval` is raised to at least [`MIN_POLL_INTERVAL`].
    pub fn new(input_dir: impl Into<PathBuf>, poll_interval: Duration, stable_for: Duration) -> Self {
        Self {
            input_dir: input_dir.into(),
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            stable_for,
            stability_timeout: DEFAULT_STABILITY_TIMEOUT,
            stop_flag: Arc::new(AtomicBool::new(false)),
            pending: PendingSet::new(),
            known: HashSet::new(),
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(
            config.input_dir.clone(),
            secs(config.poll_interval_seconds),
            secs(config.file_stability_seconds),
        )
    }

    pub fn with_stability_timeout(mut self, timeout: Duration) -> Self {
        self.stability_timeout = timeout;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Record the videos already in the directory without processing them.
    pub fn prime(&mut self) -> WildscanResult<usize> {
        let existing = list_videos(&self.input_dir)?;
        for path in &existing {
            tracing::info!(path = %path.display(), "Skipping pre-existing video");
        }
        let count = existing.len();
        self.known.extend(existing);
        Ok(count)
    }

    /// Videos that appeared since the previous call, sorted by path.
    ///
    /// Files that disappeared are forgotten, so a re-created file counts as
    /// new again.
    pub fn scan_new(&mut self) -> WildscanResult<Vec<PathBuf>> {
        let listing = list_videos(&self.input_dir)?;
        Ok(self.absorb(listing))
    }

    /// [`scan_new`](Self::scan_new) with the directory read on a blocking
    /// worker.
    async fn scan_new_off_thread(&mut self) -> WildscanResult<Vec<PathBuf>> {
        let dir = self.input_dir.clone();
        let listing = tokio::task::spawn_blocking(move || list_videos(&dir))
            .await
            .map_err(std::io::Error::other)??;
        Ok(self.absorb(listing))
    }

    fn absorb(&mut self, listing: Vec<PathBuf>) -> Vec<PathBuf> {
        let present: HashSet<PathBuf> = listing.into_iter().collect();
        self.known.retain(|p| present.contains(p));

        let mut fresh: Vec<PathBuf> = present
            .into_iter()
            .filter(|p| !self.known.contains(p))
            .collect();
        fresh.sort();
        self.known.extend(fresh.iter().cloned());
        fresh
    }

    /// Poll until the stop flag is set, calling `on_ready` for each new,
    /// stable video on a blocking worker. Waits for running workers before
    /// returning.
    pub async fn run<F>(mut self, on_ready: F) -> WildscanResult<()>
    where
        F: Fn(PathBuf) + Send + Sync + 'static,
    {
        let on_ready = Arc::new(on_ready);
        let skipped = self.prime()?;
        tracing::info!(
            input = %self.input_dir.display(),
            poll_ms = self.poll_interval.as_millis(),
            pre_existing = skipped,
            "Watching for new videos"
        );

        let mut workers = Vec::new();
        while !self.stop_flag.load(Ordering::Relaxed) {
            match self.scan_new_off_thread().await {
                Ok(fresh) => {
                    for path in fresh {
                        if let Some(worker) = self.dispatch(path, Arc::clone(&on_ready)) {
                            workers.push(worker);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to scan input directory");
                }
            }
            workers.retain(|w: &tokio::task::JoinHandle<()>| !w.is_finished());
            tokio::time::sleep(self.poll_interval).await;
        }

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Video worker panicked");
            }
        }
        tracing::info!("Watcher stopped");
        Ok(())
    }

    fn dispatch<F>(&self, path: PathBuf, on_ready: Arc<F>) -> Option<tokio::task::JoinHandle<()>>
    where
        F: Fn(PathBuf) + Send + Sync + 'static,
    {
        let Some(claim) = self.pending.try_claim(&path) else {
            tracing::debug!(path = %path.display(), "Already pending");
            return None;
        };
        tracing::info!(path = %path.display(), "New video detected");

        let stable_for = self.stable_for;
        let poll = self.poll_interval;
        let timeout = self.stability_timeout;
        Some(tokio::task::spawn_blocking(move || {
            let _claim = claim;
            if wait_until_stable(&path, stable_for, poll, timeout) {
                on_ready(path);
            } else {
                tracing::warn!(path = %path.display(), "Skipping unstable video");
            }
        }))
    }
}

fn list_videos(dir: &Path) -> WildscanResult<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_video_file(&path) {
            videos.push(path);
        }
    }
    videos.sort();
    Ok(videos)
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher(dir: &Path) -> DirectoryWatcher {
        DirectoryWatcher::new(dir, MIN_POLL_INTERVAL, Duration::from_millis(20))
    }

    #[test]
    fn test_prime_skips_existing_videos() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut watcher = watcher(dir.path());
        assert_eq!(watcher.prime().unwrap(), 1);
        assert!(watcher.scan_new().unwrap().is_empty());
    }

    #[test]
    fn test_scan_new_reports_only_new_videos() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.mp4"), b"x").unwrap();
        let mut watcher = watcher(dir.path());
        watcher.prime().unwrap();

        std::fs::write(dir.path().join("b.MOV"), b"x").unwrap();
        std::fs::write(dir.path().join("a.mkv"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub.mp4")).unwrap();

        let fresh = watcher.scan_new().unwrap();
        assert_eq!(
            fresh,
            vec![dir.path().join("a.mkv"), dir.path().join("b.MOV")]
        );
        assert!(watcher.scan_new().unwrap().is_empty());
    }

    #[test]
    fn test_recreated_file_is_new_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = watcher(dir.path());
        watcher.prime().unwrap();

        let path = dir.path().join("cam.mp4");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(watcher.scan_new().unwrap(), vec![path.clone()]);

        std::fs::remove_file(&path).unwrap();
        assert!(watcher.scan_new().unwrap().is_empty());
        std::fs::write(&path, b"y").unwrap();
        assert_eq!(watcher.scan_new().unwrap(), vec![path]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let mut watcher = watcher(Path::new("/definitely/not/a/dir"));
        assert!(watcher.prime().is_err());
    }

    #[test]
    fn test_from_config_durations() {
        let config = ScannerConfig {
            poll_interval_seconds: 0.5,
            file_stability_seconds: -1.0,
            ..ScannerConfig::default()
        };
        let watcher = DirectoryWatcher::from_config(&config);
        assert_eq!(watcher.poll_interval, Duration::from_millis(500));
        assert_eq!(watcher.stable_for, Duration::ZERO);
    }

    #[test]
    fn test_zero_poll_interval_is_floored() {
        let config = ScannerConfig {
            poll_interval_seconds: 0.0,
            ..ScannerConfig::default()
        };
        let watcher = DirectoryWatcher::from_config(&config);
        assert_eq!(watcher.poll_interval(), MIN_POLL_INTERVAL);

        let watcher = DirectoryWatcher::new("/in", Duration::from_millis(5), Duration::ZERO);
        assert_eq!(watcher.poll_interval(), MIN_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn test_off_thread_scan_matches_scan_new() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = watcher(dir.path());
        watcher.prime().unwrap();

        let path = dir.path().join("cam.mp4");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(watcher.scan_new_off_thread().await.unwrap(), vec![path]);
        assert!(watcher.scan_new().unwrap().is_empty());

        let mut missing =
            DirectoryWatcher::new("/definitely/not/a/dir", MIN_POLL_INTERVAL, Duration::ZERO);
        assert!(missing.scan_new_off_thread().await.is_err());
    }
}
