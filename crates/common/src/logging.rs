//! Logging and tracing initialization.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// When `config.file` is set, output goes to both stderr and the file. A file
/// that cannot be opened is reported once and logging continues on stderr.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let file = config.file.as_deref().and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", path.display());
            None
        }
    });

    match file {
        Some(file) => install(config, std::io::stderr.and(Mutex::new(file)), false),
        None => install(config, std::io::stderr, true),
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn install<W>(config: &LoggingConfig, writer: W, ansi: bool)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Per-video logging context.
///
/// Carries the video and detector names so every event emitted while
/// processing one video can be correlated. Passed explicitly into the
/// pipeline instead of living in a global.
///
/// The message helpers take fixed text only. Events that carry values
/// (paths, times, counts) use `tracing` macros directly with
/// [`video`](Self::video) and [`detector`](Self::detector) as fields.
#[derive(Debug, Clone)]
pub struct ScanLog {
    video: String,
    detector: String,
}

impl ScanLog {
    pub fn new(video: impl Into<String>, detector: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            detector: detector.into(),
        }
    }

    /// Context for a video file, named by its file name.
    pub fn for_video(path: &Path, detector: impl Into<String>) -> Self {
        let video = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(video, detector)
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    pub fn detector(&self) -> &str {
        &self.detector
    }

    /// Same video, different detector (used by A/B runs).
    pub fn with_detector(&self, detector: impl Into<String>) -> Self {
        Self::new(self.video.clone(), detector)
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(video = %self.video, detector = %self.detector, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(video = %self.video, detector = %self.detector, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(video = %self.video, detector = %self.detector, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(video = %self.video, detector = %self.detector, "{message}");
    }
}
