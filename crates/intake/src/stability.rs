//! Waiting for a file to finish being written.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

/// Give up on a file that keeps changing for this long.
pub const DEFAULT_STABILITY_TIMEOUT: Duration = Duration::from_secs(600);

/// Block until `path` has had the same size and modification time for at
/// least `stable_for`, checking every `poll`.
///
/// A missing or unreadable file resets the wait. Returns `false` when
/// `timeout` elapses first.
pub fn wait_until_stable(path: &Path, stable_for: Duration, poll: Duration, timeout: Duration) -> bool {
    let started = Instant::now();
    let mut last: Option<(u64, Option<SystemTime>)> = None;
    let mut unchanged_since = Instant::now();

    loop {
        let current = std::fs::metadata(path)
            .ok()
            .map(|meta| (meta.len(), meta.modified().ok()));

        match current {
            Some(state) if last == Some(state) => {
                if unchanged_since.elapsed() >= stable_for {
                    return true;
                }
            }
            Some(state) => {
                last = Some(state);
                unchanged_since = Instant::now();
            }
            None => {
                last = None;
            }
        }

        if started.elapsed() >= timeout {
            tracing::warn!(
                path = %path.display(),
                timeout_secs = timeout.as_secs_f64(),
                "File never became stable"
            );
            return false;
        }
        std::thread::sleep(poll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"done").unwrap();

        assert!(wait_until_stable(
            &path,
            Duration::from_millis(30),
            Duration::from_millis(10),
            Duration::from_secs(5),
        ));
    }

    #[test]
    fn test_missing_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let started = Instant::now();

        assert!(!wait_until_stable(
            &dir.path().join("never.mp4"),
            Duration::from_millis(10),
            Duration::from_millis(10),
            Duration::from_millis(80),
        ));
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_growing_file_waits_for_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growing.mp4");
        std::fs::write(&path, b"a").unwrap();

        let writer_path = path.clone();
        let writer = std::thread::spawn(move || {
            for _ in 0..5 {
                std::thread::sleep(Duration::from_millis(20));
                let mut data = std::fs::read(&writer_path).unwrap();
                data.push(b'a');
                std::fs::write(&writer_path, data).unwrap();
            }
        });

        assert!(wait_until_stable(
            &path,
            Duration::from_millis(150),
            Duration::from_millis(10),
            Duration::from_secs(5),
        ));
        writer.join().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 6);
    }
}
